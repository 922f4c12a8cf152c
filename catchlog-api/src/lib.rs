//! catchlog-api library interface
//!
//! Trip report submission service: multipart intake, picture upload to an
//! object store, catch reconciliation, and the admin/reference HTTP API.

pub mod api;
pub mod assets;
pub mod db;
pub mod error;
pub mod ingest;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::assets::AssetStore;
use crate::ingest::AttachmentDemultiplexer;
use crate::services::TripIngest;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Object store for uploaded pictures
    pub assets: Arc<dyn AssetStore>,
    /// Expected `x-admin-api-key`; `None` disables the check
    pub admin_token: Option<String>,
    /// Request body limit in bytes
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        assets: Arc<dyn AssetStore>,
        admin_token: Option<String>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            assets,
            admin_token,
            max_upload_bytes,
            startup_time: Utc::now(),
        }
    }

    /// Ingestion service bound to this state's pool and asset store
    pub fn trip_ingest(&self) -> TripIngest {
        TripIngest::new(
            self.db.clone(),
            AttachmentDemultiplexer::new(Arc::clone(&self.assets)),
        )
    }
}

/// Build application router
///
/// Trip endpoints require the admin key; reference lists and health are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    let protected = api::trip_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        api::admin_auth,
    ));

    let public = Router::new()
        .merge(api::reference_routes())
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
