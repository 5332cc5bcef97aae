//! HTTP error response conversion
//!
//! Wraps `AppError` so the whole taxonomy maps onto status codes and a JSON
//! body in one place. Validation failures carry their aggregated field list;
//! internal fault details stay in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use vitrina_core::{AppError, FieldError, LogLevel};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Per-field violations for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

/// Wrapper type for AppError to implement IntoResponse (orphan rules: both
/// IntoResponse and AppError live elsewhere).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

fn log_error(error: &AppError) {
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, code, "Request failed"),
        LogLevel::Warn => tracing::warn!(error = %error, code, "Request failed"),
        LogLevel::Error => tracing::error!(error = %error, code, "Request failed"),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = self.0;

        log_error(&app_error);

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
            fields: app_error.fields().map(|fields| fields.to_vec()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_core::Rendition;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (AppError::invalid("name", "required"), 400),
            (AppError::Unauthorized("no token".into()), 401),
            (AppError::Forbidden("not a super user".into()), 403),
            (AppError::NotFound("profile".into()), 404),
            (AppError::Conflict("slug taken".into()), 409),
            (AppError::NotModified("profile 1".into()), 409),
            (AppError::Storage("disk full".into()), 500),
            (AppError::processing(Rendition::Thumbnail, "boom"), 500),
        ];
        for (error, status) in cases {
            let response = HttpAppError(error).into_response();
            assert_eq!(response.status().as_u16(), status);
        }
    }
}
