//! Submission ingestion and reconciliation
//!
//! A trip submission carries two flat file lists: trip pictures, and the
//! pictures of every catch concatenated together. Each catch declares how many
//! of the concatenated pictures belong to it. Ingestion runs in two stages:
//!
//! 1. **Demultiplexing** ([`demux`]): a cursor walks the catch-picture batch,
//!    handing each catch its declared slice (clamped to what remains), and
//!    uploads every slice to the asset store.
//! 2. **Reconciliation** ([`reconcile`]): on edit, each submitted catch is
//!    classified as an update of a persisted catch or a new insert, and the
//!    trip's picture list is retained, replaced, or cleared.
//!
//! Both stages are request-scoped and hold no state between requests.

pub mod demux;
pub mod reconcile;
pub mod submission;
pub mod types;

pub use demux::{plan_slices, AttachmentDemultiplexer, SlicePlan};
pub use reconcile::{decide_trip_pictures, partition, reconcile, reconcile_for_create};
pub use submission::{Submission, SubmissionError, SubmissionForm};
pub use types::{
    AttachmentSet, CatchInput, CatchUpdate, DemuxedCatch, NewCatch, PicturesAction,
    ReconciledCatch, TripPictureDecision, UploadedFile,
};
