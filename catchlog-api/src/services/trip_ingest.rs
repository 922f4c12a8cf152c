//! Trip creation and editing
//!
//! Runs a parsed submission through upload, demultiplexing, reconciliation
//! and persistence. Upload failures only drop the affected attachment; record
//! store failures fail the request.

use catchlog_common::models::{Trip, TripWithCatches};
use catchlog_common::{Error, Result};
use sqlx::{Pool, Sqlite};
use tracing::info;
use uuid::Uuid;

use crate::db::{catches, trips};
use crate::ingest::{
    decide_trip_pictures, partition, reconcile, reconcile_for_create, AttachmentDemultiplexer,
    CatchInput, DemuxedCatch, Submission, UploadedFile,
};

/// Message returned when an edit targets a trip that does not exist
pub const TRIP_NOT_FOUND: &str = "trip not found";

/// Trip ingestion service
#[derive(Clone)]
pub struct TripIngest {
    db: Pool<Sqlite>,
    demux: AttachmentDemultiplexer,
}

impl TripIngest {
    pub fn new(db: Pool<Sqlite>, demux: AttachmentDemultiplexer) -> Self {
        Self { db, demux }
    }

    /// Create a trip with its catches
    ///
    /// Every catch is new: client-supplied catch ids are not kept. The trip
    /// and its catches are stored in one transaction.
    pub async fn create(&self, submission: Submission) -> Result<Trip> {
        let trip_id = Uuid::new_v4().to_string();

        let pictures = self.demux.upload_successful(&submission.trip_pictures).await;
        let demuxed = self
            .demux_catches(&submission.catch_pictures, submission.catches)
            .await;
        let (_, inserts) = partition(reconcile_for_create(&trip_id, demuxed));

        let trip = trips::create_trip_with_catches(
            &self.db,
            &trip_id,
            &submission.trip,
            &pictures,
            &inserts,
        )
        .await?;

        info!(
            trip_id = %trip.id,
            pictures = trip.pictures.len(),
            catches = inserts.len(),
            "Trip created"
        );

        Ok(trip)
    }

    /// Apply an edit to an existing trip and return the stored result
    pub async fn edit(&self, trip_id: &str, submission: Submission) -> Result<TripWithCatches> {
        let prior = trips::load_trip_with_catches(&self.db, trip_id)
            .await?
            .ok_or_else(|| Error::InvalidInput(TRIP_NOT_FOUND.to_string()))?;

        let uploads = self.demux.upload_successful(&submission.trip_pictures).await;
        let pictures =
            decide_trip_pictures(&prior.trip.pictures, uploads, submission.pictures_action)
                .into_pictures();

        let demuxed = self
            .demux_catches(&submission.catch_pictures, submission.catches)
            .await;
        let (updates, inserts) = partition(reconcile(trip_id, demuxed, &prior.fishes));

        let updated = catches::update_catches(&self.db, trip_id, &updates).await?;
        let inserted = catches::insert_catches(&self.db, &inserts).await?;

        if !trips::update_trip(&self.db, trip_id, &submission.trip, &pictures).await? {
            return Err(Error::InvalidInput(TRIP_NOT_FOUND.to_string()));
        }

        info!(
            trip_id,
            catches_updated = updated,
            catches_inserted = inserted.len(),
            pictures = pictures.len(),
            "Trip edited"
        );

        trips::load_trip_with_catches(&self.db, trip_id)
            .await?
            .ok_or_else(|| Error::InvalidInput(TRIP_NOT_FOUND.to_string()))
    }

    async fn demux_catches(
        &self,
        batch: &[UploadedFile],
        records: Vec<CatchInput>,
    ) -> Vec<DemuxedCatch> {
        let sets = self.demux.demux(batch, &records).await;
        records
            .into_iter()
            .zip(sets)
            .map(|(record, set)| record.with_attachments(set))
            .collect()
    }
}
