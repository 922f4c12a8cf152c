//! Multipart form reading
//!
//! Reads every part of a trip submission into memory. Only image files are
//! accepted, and only under the two known file fields.

use axum::extract::Multipart;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::ingest::submission::{CATCH_PICTURES_FIELD, TRIP_PICTURES_FIELD};
use crate::ingest::{SubmissionForm, UploadedFile};

/// Maximum number of trip pictures per request
pub const MAX_TRIP_PICTURES: usize = 10;
/// Maximum number of catch pictures per request
pub const MAX_CATCH_PICTURES: usize = 50;

pub async fn read_submission_form(mut multipart: Multipart) -> ApiResult<SubmissionForm> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Invalid field {}: {}", name, e.body_text())))?;
            form.fields.insert(name, value);
            continue;
        };

        let (files, limit) = match name.as_str() {
            TRIP_PICTURES_FIELD => (&mut form.trip_pictures, MAX_TRIP_PICTURES),
            CATCH_PICTURES_FIELD => (&mut form.catch_pictures, MAX_CATCH_PICTURES),
            other => {
                return Err(ApiError::BadRequest(format!("Unexpected file field: {}", other)));
            }
        };

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::BadRequest("Only image files are allowed!".to_string()));
        }

        if files.len() >= limit {
            return Err(ApiError::BadRequest(format!(
                "Too many files for {} (max {})",
                name, limit
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", file_name, e.body_text())))?;

        debug!(field = %name, file = %file_name, size = bytes.len(), "Received file");
        files.push(UploadedFile::new(file_name, content_type, bytes));
    }

    Ok(form)
}
