//! Trip report models shared by the record store and the HTTP layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status assigned to every newly created trip report
pub const STATUS_PENDING: &str = "Pending";

/// Opaque catch fields, stored and returned verbatim
pub type CatchFields = Map<String, Value>;

/// Persisted trip report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub nickname: Option<String>,
    pub city: Option<String>,
    pub boat: Option<String>,
    pub landing: Option<String>,
    #[serde(rename = "type")]
    pub trip_type: Option<String>,
    pub setup: Option<String>,
    pub report: Option<String>,
    pub user_email: Option<String>,
    pub trip_date: Option<DateTime<Utc>>,
    pub status: String,
    pub conditions: Option<i64>,
    pub anglers: Option<i64>,
    /// Public URLs of the trip-level pictures, in upload order
    pub pictures: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted catch belonging to a trip
///
/// The catch's own fields are opaque and flattened into the JSON form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catch {
    pub id: String,
    #[serde(rename = "report_id")]
    pub report_id: String,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: CatchFields,
}

/// Trip together with its catches, ordered by creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripWithCatches {
    #[serde(flatten)]
    pub trip: Trip,
    pub fishes: Vec<Catch>,
}

/// Scalar trip fields supplied by a submission
///
/// Every field is optional: on create, absent fields are stored as NULL; on
/// update, absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFields {
    pub nickname: Option<String>,
    pub city: Option<String>,
    pub boat: Option<String>,
    pub landing: Option<String>,
    pub trip_type: Option<String>,
    pub setup: Option<String>,
    pub report: Option<String>,
    pub user_email: Option<String>,
    pub trip_date: Option<DateTime<Utc>>,
    /// Review status; ignored on create, where every trip starts as pending
    pub status: Option<String>,
    pub conditions: Option<i64>,
    pub anglers: Option<i64>,
}

/// Summary returned after a trip is created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripCreated {
    pub trip_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Trip> for TripCreated {
    fn from(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id.clone(),
            status: trip.status.clone(),
            created_at: trip.created_at,
            updated_at: trip.updated_at,
        }
    }
}

/// Entry of a static reference list (boats, locations, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceItem {
    pub id: i64,
    pub name: String,
}
