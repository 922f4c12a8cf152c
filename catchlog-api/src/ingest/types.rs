//! Request-scoped types flowing through ingestion

use axum::body::Bytes;
use catchlog_common::models::CatchFields;

/// Ordered public URLs attached to one record
pub type AttachmentSet = Vec<String>;

/// One uploaded file, already read from the multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// One catch as submitted by the client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchInput {
    /// Persisted identifier; `None` for a new catch
    pub id: Option<String>,
    /// Number of files this catch owns in the catch-picture batch
    pub attachment_count: usize,
    /// Already-uploaded attachment URLs echoed back by the client
    pub attachments: Option<Vec<String>>,
    /// Remaining catch fields, opaque to ingestion
    pub fields: CatchFields,
}

impl CatchInput {
    /// Pre-existing attachments, if the client sent a non-empty list
    ///
    /// A catch with pre-existing attachments never consumes uploaded files.
    pub fn existing_attachments(&self) -> Option<&[String]> {
        self.attachments
            .as_deref()
            .filter(|attachments| !attachments.is_empty())
    }

    /// Pair this input with its resolved attachment set
    pub fn with_attachments(self, attachments: AttachmentSet) -> DemuxedCatch {
        DemuxedCatch {
            id: self.id,
            fields: self.fields,
            attachments,
        }
    }
}

/// Catch after demultiplexing, ready for reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct DemuxedCatch {
    pub id: Option<String>,
    pub fields: CatchFields,
    pub attachments: AttachmentSet,
}

/// Partial update of a persisted catch
#[derive(Debug, Clone, PartialEq)]
pub struct CatchUpdate {
    pub id: String,
    /// Fields to merge into the stored ones (never contains `id`)
    pub fields: CatchFields,
    pub attachments: AttachmentSet,
}

/// Catch to be inserted under a trip
#[derive(Debug, Clone, PartialEq)]
pub struct NewCatch {
    pub trip_id: String,
    pub fields: CatchFields,
    pub attachments: AttachmentSet,
}

/// Outcome of reconciling one submitted catch
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciledCatch {
    Update(CatchUpdate),
    Insert(NewCatch),
}

/// Explicit instruction about the trip's picture list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PicturesAction {
    /// Remove every trip picture
    Delete,
}

impl PicturesAction {
    /// Parse the `picturesAction` form value; unrecognised values are ignored
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "delete" => Some(PicturesAction::Delete),
            _ => None,
        }
    }
}

/// What to persist as the trip's picture list
#[derive(Debug, Clone, PartialEq)]
pub enum TripPictureDecision {
    /// Copy the persisted list forward unchanged
    RetainExisting(Vec<String>),
    /// Replace the list with freshly uploaded pictures
    ReplaceWith(Vec<String>),
    /// Persist an empty list
    Clear,
}

impl TripPictureDecision {
    /// Final picture list to store
    pub fn into_pictures(self) -> Vec<String> {
        match self {
            TripPictureDecision::RetainExisting(pictures)
            | TripPictureDecision::ReplaceWith(pictures) => pictures,
            TripPictureDecision::Clear => Vec::new(),
        }
    }
}
