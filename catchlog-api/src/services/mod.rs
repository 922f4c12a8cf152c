//! Request-level workflows built on the ingest stages and the record store

pub mod trip_ingest;

pub use trip_ingest::{TripIngest, TRIP_NOT_FOUND};
