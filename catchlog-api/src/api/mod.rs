//! HTTP API handlers for catchlog-api

pub mod auth;
pub mod health;
pub mod multipart;
pub mod reference;
pub mod trips;

pub use auth::admin_auth;
pub use health::health_routes;
pub use reference::reference_routes;
pub use trips::trip_routes;
