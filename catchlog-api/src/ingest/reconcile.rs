//! Catch reconciliation and trip picture policy
//!
//! Pure functions: no I/O, no failure modes.

use catchlog_common::models::Catch;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::types::{
    CatchUpdate, DemuxedCatch, NewCatch, PicturesAction, ReconciledCatch, TripPictureDecision,
};

/// Classify submitted catches against the catches persisted for `trip_id`
///
/// A catch whose id belongs to `prior` becomes an update; anything else,
/// including an id the trip does not own, becomes an insert under `trip_id`.
/// Output order and length match `submitted`.
pub fn reconcile(trip_id: &str, submitted: Vec<DemuxedCatch>, prior: &[Catch]) -> Vec<ReconciledCatch> {
    let known: HashSet<&str> = prior.iter().map(|c| c.id.as_str()).collect();

    submitted
        .into_iter()
        .map(|catch| match catch.id {
            Some(id) if known.contains(id.as_str()) => ReconciledCatch::Update(CatchUpdate {
                id,
                fields: catch.fields,
                attachments: catch.attachments,
            }),
            unknown => {
                if let Some(id) = unknown {
                    info!(
                        trip_id,
                        catch_id = %id,
                        "Catch id not found on trip, inserting as new catch"
                    );
                }
                ReconciledCatch::Insert(NewCatch {
                    trip_id: trip_id.to_string(),
                    fields: catch.fields,
                    attachments: catch.attachments,
                })
            }
        })
        .collect()
}

/// On create there is nothing to compare against: every catch is an insert
pub fn reconcile_for_create(trip_id: &str, submitted: Vec<DemuxedCatch>) -> Vec<ReconciledCatch> {
    reconcile(trip_id, submitted, &[])
}

/// Split reconciled catches into updates and inserts, keeping relative order
///
/// Updates naming the same catch collapse into one, at the position of the
/// first: later fields are merged over earlier ones and the last attachment
/// set wins. The result equals applying the updates in submission order, so
/// the returned updates can run concurrently.
pub fn partition(reconciled: Vec<ReconciledCatch>) -> (Vec<CatchUpdate>, Vec<NewCatch>) {
    let mut updates: Vec<CatchUpdate> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut inserts = Vec::new();

    for catch in reconciled {
        match catch {
            ReconciledCatch::Update(update) => match positions.get(&update.id) {
                Some(&index) => {
                    debug!(catch_id = %update.id, "Merging repeated update for catch");
                    let merged = &mut updates[index];
                    merged.fields.extend(update.fields);
                    merged.attachments = update.attachments;
                }
                None => {
                    positions.insert(update.id.clone(), updates.len());
                    updates.push(update);
                }
            },
            ReconciledCatch::Insert(insert) => inserts.push(insert),
        }
    }
    (updates, inserts)
}

/// Decide the trip's picture list
///
/// Precedence: explicit delete, then newly uploaded pictures, then the
/// persisted list.
pub fn decide_trip_pictures(
    prior: &[String],
    new_uploads: Vec<String>,
    action: Option<PicturesAction>,
) -> TripPictureDecision {
    match action {
        Some(PicturesAction::Delete) => TripPictureDecision::Clear,
        None if !new_uploads.is_empty() => TripPictureDecision::ReplaceWith(new_uploads),
        None => TripPictureDecision::RetainExisting(prior.to_vec()),
    }
}
