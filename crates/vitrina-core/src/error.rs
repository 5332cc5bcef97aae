//! Error types module
//!
//! All failures in Vitrina are unified under the `AppError` enum. Validation
//! failures aggregate every violated field at once so a client can fix a form
//! in a single round trip; the remaining variants map one-to-one onto the
//! fault classes the pipeline can hit (conflict, missing resource, storage
//! I/O, image processing, zero-row update).

use crate::models::image::Rendition;
use serde::Serialize;
use utoipa::ToSchema;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors such as validation failures
    Debug,
    /// Recoverable or client-triggered faults worth noticing
    Warn,
    /// Unexpected failures
    Error,
}

/// A single violated field inside an aggregate validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Client-correctable input failures, all violations at once.
    #[error("validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// Unique-constraint violation (profile slug, user email, ...).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// An update matched zero records. Terminal, not retryable.
    #[error("nothing to update: {0}")]
    NotModified(String),

    /// Directory or file I/O failure under the public root.
    #[error("storage fault: {0}")]
    Storage(String),

    /// Crop/resize/encode failure, tagged with the rendition that failed.
    #[error("{rendition} rendition failed: {message}")]
    Processing {
        rendition: Rendition,
        message: String,
    },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    /// Single-field validation failure shorthand.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn processing(rendition: Rendition, message: impl Into<String>) -> Self {
        AppError::Processing {
            rendition,
            message: message.into(),
        }
    }

    /// Machine-readable error code for response bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::NotModified(_) => "NOT_MODIFIED",
            AppError::Storage(_) => "STORAGE_FAULT",
            AppError::Processing { .. } => "PROCESSING_FAULT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) | AppError::NotModified(_) => 409,
            AppError::Storage(_)
            | AppError::Processing { .. }
            | AppError::Database(_)
            | AppError::Internal(_) => 500,
        }
    }

    /// Message safe to show to clients. Internal fault details stay in logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Field list for aggregate validation responses, if any.
    pub fn fields(&self) -> Option<&[FieldError]> {
        match self {
            AppError::Validation(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::Unauthorized(_)
            | AppError::Forbidden(_) => LogLevel::Debug,
            AppError::Conflict(_) | AppError::NotModified(_) | AppError::Processing { .. } => {
                LogLevel::Warn
            }
            AppError::Storage(_) | AppError::Database(_) | AppError::Internal(_) => LogLevel::Error,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_aggregates_all_fields() {
        let err = AppError::Validation(vec![
            FieldError::new("name", "Name is required."),
            FieldError::new("aspectRatio", "Choose the aspect ratio."),
        ]);
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert_eq!(err.fields().unwrap().len(), 2);
        let text = err.to_string();
        assert!(text.contains("name"));
        assert!(text.contains("aspectRatio"));
    }

    #[test]
    fn processing_error_names_the_failed_rendition() {
        let err = AppError::processing(Rendition::Cropped, "decode failed");
        assert_eq!(err.http_status_code(), 500);
        assert!(err.to_string().contains("cropped"));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn not_modified_is_a_conflict_class_status() {
        let err = AppError::NotModified("upload profile 42".to_string());
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "NOT_MODIFIED");
    }

    #[test]
    fn internal_details_are_hidden_from_clients() {
        let err = AppError::Internal("secret pool state".to_string());
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.log_level(), LogLevel::Error);
    }
}
