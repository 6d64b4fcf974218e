use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error, PartialEq)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Slot already booked")]
    Conflict,
    #[error("{0}")]
    Store(String),
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // A taken slot is reported like any other rejected booking request.
            BookingError::Validation(_) | BookingError::Conflict => StatusCode::BAD_REQUEST,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DieselError> for BookingError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                BookingError::Conflict
            }
            DieselError::NotFound => BookingError::NotFound("Record not found".into()),
            err => BookingError::Store(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for BookingError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort_unstable();
        BookingError::Validation(format!("Missing or invalid fields: {}", fields.join(", ")))
    }
}

impl From<JsonRejection> for BookingError {
    fn from(rejection: JsonRejection) -> Self {
        BookingError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(err = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Failure of the outbound email transport. Never surfaced to clients.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to build email: {0}")]
    Build(String),
    #[error("Failed to send email: {0}")]
    Send(String),
}
