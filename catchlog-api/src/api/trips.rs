//! Trip endpoints (admin key required)

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use catchlog_common::models::{TripCreated, TripWithCatches};
use serde::Deserialize;
use tracing::info;

use super::multipart::read_submission_form;
use crate::db::trips;
use crate::error::{ApiError, ApiResult};
use crate::ingest::Submission;
use crate::AppState;

/// Query parameters for GET /getTripsList
#[derive(Debug, Deserialize)]
pub struct TripsListQuery {
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,
}

/// POST /createTrip
pub async fn create_trip(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<TripCreated>> {
    let form = read_submission_form(multipart).await?;
    let submission = Submission::parse(form)?;

    let trip = state.trip_ingest().create(submission).await?;
    Ok(Json(TripCreated::from(&trip)))
}

/// PUT /editTrip/:id
pub async fn edit_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<TripWithCatches>> {
    let form = read_submission_form(multipart).await?;
    let submission = Submission::parse(form)?;

    let trip = state.trip_ingest().edit(&trip_id, submission).await?;
    Ok(Json(trip))
}

/// GET /getTripsList
pub async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripsListQuery>,
) -> ApiResult<Json<Vec<TripWithCatches>>> {
    let email = query
        .user_email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty());

    let trips = trips::list_trips_with_catches(&state.db, email).await?;
    Ok(Json(trips))
}

/// GET /getTrip/:id
pub async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> ApiResult<Json<TripWithCatches>> {
    trips::load_trip_with_catches(&state.db, &trip_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Trip {} not found", trip_id)))
}

/// DELETE /deleteTrip/:id
pub async fn delete_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> ApiResult<StatusCode> {
    if !trips::delete_trip(&state.db, &trip_id).await? {
        return Err(ApiError::NotFound(format!("Trip {} not found", trip_id)));
    }

    info!(trip_id = %trip_id, "Trip deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Build trip routes; the caller applies the admin key layer
pub fn trip_routes() -> Router<AppState> {
    Router::new()
        .route("/createTrip", post(create_trip))
        .route("/editTrip/:id", put(edit_trip))
        .route("/getTripsList", get(list_trips))
        .route("/getTrip/:id", get(get_trip))
        .route("/deleteTrip/:id", delete(delete_trip))
}
