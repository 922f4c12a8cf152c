//! Public reference list endpoints

use axum::{extract::State, routing::get, Json, Router};
use catchlog_common::models::ReferenceItem;

use crate::db::reference::{list_reference, ReferenceList};
use crate::error::ApiResult;
use crate::AppState;

async fn list(state: &AppState, list: ReferenceList) -> ApiResult<Json<Vec<ReferenceItem>>> {
    Ok(Json(list_reference(&state.db, list).await?))
}

/// GET /getTripTypes
pub async fn get_trip_types(State(state): State<AppState>) -> ApiResult<Json<Vec<ReferenceItem>>> {
    list(&state, ReferenceList::TripTypes).await
}

/// GET /getLocations
pub async fn get_locations(State(state): State<AppState>) -> ApiResult<Json<Vec<ReferenceItem>>> {
    list(&state, ReferenceList::Locations).await
}

/// GET /getLandingTypes
pub async fn get_landing_types(State(state): State<AppState>) -> ApiResult<Json<Vec<ReferenceItem>>> {
    list(&state, ReferenceList::Landings).await
}

/// GET /getFishTypes
pub async fn get_fish_types(State(state): State<AppState>) -> ApiResult<Json<Vec<ReferenceItem>>> {
    list(&state, ReferenceList::FishTypes).await
}

/// GET /getBoatNames
pub async fn get_boat_names(State(state): State<AppState>) -> ApiResult<Json<Vec<ReferenceItem>>> {
    list(&state, ReferenceList::Boats).await
}

pub fn reference_routes() -> Router<AppState> {
    Router::new()
        .route("/getTripTypes", get(get_trip_types))
        .route("/getLocations", get(get_locations))
        .route("/getLandingTypes", get(get_landing_types))
        .route("/getFishTypes", get(get_fish_types))
        .route("/getBoatNames", get(get_boat_names))
}
