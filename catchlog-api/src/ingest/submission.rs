//! Submission parsing
//!
//! Turns the already-read multipart form (text fields plus the two file
//! lists) into typed trip fields and catch inputs.
//!
//! # Wire format
//! - Trip fields: `nickname`, `city`, `boat`, `landing`, `type`, `setup`,
//!   `report`, `userEmail`, `tripDate`, `status`, `conditions`, `anglers`
//! - `fishCaught`: JSON array of catch objects (a single object is accepted
//!   as a one-element list)
//! - `picturesAction`: `"delete"` clears the trip pictures on edit
//! - Files: `pictures` (trip) and `fishCaughtPictures` (all catches, concatenated)

use catchlog_common::models::TripFields;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use super::types::{CatchInput, PicturesAction, UploadedFile};

/// Form field holding the catch list
pub const CATCHES_FIELD: &str = "fishCaught";
/// Form field holding the trip picture action
pub const PICTURES_ACTION_FIELD: &str = "picturesAction";
/// File field for trip pictures
pub const TRIP_PICTURES_FIELD: &str = "pictures";
/// File field for the concatenated catch pictures
pub const CATCH_PICTURES_FIELD: &str = "fishCaughtPictures";

/// Catch keys owned by the record store; echoed values are discarded
const STORE_MANAGED_CATCH_KEYS: [&str; 3] = ["report_id", "createdAt", "updatedAt"];

/// Submission parsing errors
#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("fishCaught is not valid JSON: {0}")]
    CatchListJson(String),

    #[error("fishCaught must be an object or a list of objects")]
    CatchListShape,

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

/// Multipart form after reading, before interpretation
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    /// Text fields; a repeated name keeps the last value
    pub fields: BTreeMap<String, String>,
    pub trip_pictures: Vec<UploadedFile>,
    pub catch_pictures: Vec<UploadedFile>,
}

/// Parsed submission
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub trip: TripFields,
    pub catches: Vec<CatchInput>,
    pub pictures_action: Option<PicturesAction>,
    pub trip_pictures: Vec<UploadedFile>,
    pub catch_pictures: Vec<UploadedFile>,
}

impl Submission {
    pub fn parse(form: SubmissionForm) -> Result<Self, SubmissionError> {
        let SubmissionForm {
            fields,
            trip_pictures,
            catch_pictures,
        } = form;

        let mut trip = TripFields::default();
        let mut catches = Vec::new();
        let mut pictures_action = None;

        for (name, value) in fields {
            match name.as_str() {
                "nickname" => trip.nickname = Some(value),
                "city" => trip.city = Some(value),
                "boat" => trip.boat = Some(value),
                "landing" => trip.landing = Some(value),
                "type" => trip.trip_type = Some(value),
                "setup" => trip.setup = Some(value),
                "report" => trip.report = Some(value),
                "userEmail" => trip.user_email = Some(value),
                "status" => trip.status = Some(value),
                "tripDate" => trip.trip_date = parse_trip_date(&value)?,
                "conditions" => trip.conditions = parse_count_field("conditions", &value)?,
                "anglers" => trip.anglers = parse_count_field("anglers", &value)?,
                CATCHES_FIELD => catches = parse_catch_list(&value)?,
                PICTURES_ACTION_FIELD => pictures_action = PicturesAction::parse(&value),
                other => debug!(field = other, "Ignoring unknown submission field"),
            }
        }

        Ok(Self {
            trip,
            catches,
            pictures_action,
            trip_pictures,
            catch_pictures,
        })
    }
}

/// Parse the `fishCaught` JSON value
///
/// Blank means no catches. A single object is coerced into a one-element list.
pub fn parse_catch_list(raw: &str) -> Result<Vec<CatchInput>, SubmissionError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_json::from_str(raw).map_err(|e| SubmissionError::CatchListJson(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        Value::Null => Vec::new(),
        _ => return Err(SubmissionError::CatchListShape),
    };

    items.into_iter().map(parse_catch).collect()
}

/// Split one catch object into id, count, attachments, and opaque fields
fn parse_catch(value: Value) -> Result<CatchInput, SubmissionError> {
    let Value::Object(mut fields) = value else {
        return Err(SubmissionError::CatchListShape);
    };

    let id = fields.remove("id").and_then(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    for key in STORE_MANAGED_CATCH_KEYS {
        fields.remove(key);
    }

    let count_value = fields
        .remove("picturesCount")
        .or_else(|| fields.remove("attachmentCount"));
    // Both spellings are control keys and never stored
    fields.remove("attachmentCount");
    let attachment_count = count_value.map(attachment_count).unwrap_or(0);

    let attachments = fields.remove("attachments").and_then(|v| match v {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(url) => Some(url),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    });

    Ok(CatchInput {
        id,
        attachment_count,
        attachments,
        fields,
    })
}

/// Lenient count: numbers and numeric strings; negative or garbage is 0
fn attachment_count(value: Value) -> usize {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0) as usize,
        Value::String(s) => s.trim().parse::<usize>().unwrap_or(0),
        _ => 0,
    }
}

/// Integer trip field; blank means absent
fn parse_count_field(field: &str, value: &str) -> Result<Option<i64>, SubmissionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| SubmissionError::InvalidField {
            field: field.to_string(),
            reason: format!("expected an integer, got {:?}", value),
        })
}

/// Trip date: RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC), or `YYYY-MM-DD` (midnight UTC)
pub fn parse_trip_date(value: &str) -> Result<Option<DateTime<Utc>>, SubmissionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(midnight.and_utc()));
        }
    }

    Err(SubmissionError::InvalidField {
        field: "tripDate".to_string(),
        reason: format!("unrecognised date {:?}", value),
    })
}
