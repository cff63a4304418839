//! Error types for the attendance service.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Failure talking to the employee directory or attendance log.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An attendance row for the same `(id, date)` already exists.
    #[error("attendance already recorded for {id} on {date}")]
    Duplicate { id: String, date: chrono::NaiveDate },

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A row came back in a shape we cannot map.
    #[error("malformed row: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Classifies an insert failure, separating key conflicts from everything
    /// else. Foreign key failures share SQLSTATE 23000 with key conflicts in
    /// MySQL, so the driver's error kind decides.
    pub fn from_insert(e: sqlx::Error, id: &str, date: chrono::NaiveDate) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate {
                    id: id.to_string(),
                    date,
                };
            }
        }
        StoreError::Database(e)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

/// Failure while recording a scan. Business outcomes such as an unknown
/// badge are not errors; see `ScanOutcome`.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("failed to record attendance: {0}")]
    Store(#[from] StoreError),
}

impl ResponseError for RecordError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "title": "Scan Failed",
            "message": "Something went wrong, please try scanning again"
        }))
    }
}

/// Failure of the best-effort spreadsheet mirror.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("spreadsheet mirror unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the scan loop. Only camera acquisition can fail; every other
/// path degrades to "no decode this tick".
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
}

impl ScanError {
    pub fn camera(message: impl Into<String>) -> Self {
        ScanError::CameraUnavailable(message.into())
    }
}

impl ResponseError for ScanError {
    fn status_code(&self) -> StatusCode {
        StatusCode::SERVICE_UNAVAILABLE
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "title": "Scan Failed",
            "message": "Camera access denied or not available"
        }))
    }
}
