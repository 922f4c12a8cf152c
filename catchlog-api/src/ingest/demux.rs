//! Attachment demultiplexer
//!
//! Splits the flat catch-picture batch into per-catch slices using each
//! catch's declared count, then uploads every slice.
//!
//! # Cursor rules
//! - The cursor only moves forward, one catch at a time, in submission order.
//! - A catch with a non-empty pre-existing `attachments` list keeps it and
//!   does not move the cursor.
//! - Otherwise the catch takes `min(count, remaining)` files. Once the batch
//!   is exhausted every later catch gets an empty set.
//!
//! # Uploads
//! Files of one slice upload concurrently and are awaited together; slices are
//! uploaded one after another. A failed upload drops that attachment only.

use futures::future::join_all;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{AttachmentSet, CatchInput, UploadedFile};
use crate::assets::{object_name, AssetStore};

/// Where one catch's attachments come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlicePlan {
    /// Keep the client's pre-existing URLs
    Existing(Vec<String>),
    /// Upload this range of the batch (possibly empty)
    Upload(Range<usize>),
}

/// Assign batch ranges to catches without touching the files
///
/// Ranges are disjoint, ascending, and lie within `0..batch_len`.
pub fn plan_slices(batch_len: usize, records: &[CatchInput]) -> Vec<SlicePlan> {
    let (_, plans) = records.iter().fold(
        (0usize, Vec::with_capacity(records.len())),
        |(cursor, mut plans), record| {
            if let Some(existing) = record.existing_attachments() {
                plans.push(SlicePlan::Existing(existing.to_vec()));
                return (cursor, plans);
            }

            let take = record.attachment_count.min(batch_len - cursor);
            plans.push(SlicePlan::Upload(cursor..cursor + take));
            (cursor + take, plans)
        },
    );
    plans
}

/// Uploads attachment slices to the asset store
#[derive(Clone)]
pub struct AttachmentDemultiplexer {
    store: Arc<dyn AssetStore>,
}

impl AttachmentDemultiplexer {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    /// Upload every file concurrently
    ///
    /// Returns one entry per file, in input order; `None` marks a failed upload.
    pub async fn upload_all(&self, files: &[UploadedFile]) -> Vec<Option<String>> {
        let uploads = files.iter().map(|file| {
            let store = Arc::clone(&self.store);
            async move {
                let name = object_name(&file.file_name);
                match store
                    .put(&name, file.bytes.clone(), &file.content_type)
                    .await
                {
                    Ok(url) => {
                        debug!(store = store.name(), object = %name, "Attachment uploaded");
                        Some(url)
                    }
                    Err(e) => {
                        warn!(
                            store = store.name(),
                            file = %file.file_name,
                            error = %e,
                            "Attachment upload failed, dropping attachment"
                        );
                        None
                    }
                }
            }
        });

        join_all(uploads).await
    }

    /// Upload every file and keep only the successful URLs, in input order
    pub async fn upload_successful(&self, files: &[UploadedFile]) -> AttachmentSet {
        self.upload_all(files).await.into_iter().flatten().collect()
    }

    /// Resolve one attachment set per record
    ///
    /// The result has exactly one entry per record, in record order.
    pub async fn demux(&self, batch: &[UploadedFile], records: &[CatchInput]) -> Vec<AttachmentSet> {
        let plans = plan_slices(batch.len(), records);
        let mut sets = Vec::with_capacity(plans.len());

        for (index, plan) in plans.into_iter().enumerate() {
            let set = match plan {
                SlicePlan::Existing(urls) => urls,
                SlicePlan::Upload(range) if range.is_empty() => Vec::new(),
                SlicePlan::Upload(range) => {
                    debug!(
                        catch_index = index,
                        files = range.len(),
                        first = range.start,
                        "Uploading catch attachment slice"
                    );
                    self.upload_successful(&batch[range]).await
                }
            };
            sets.push(set);
        }

        let declared: usize = records.iter().map(|r| r.attachment_count).sum();
        if declared > batch.len() {
            debug!(
                declared,
                received = batch.len(),
                "Declared catch picture counts exceed received files"
            );
        }

        sets
    }
}
