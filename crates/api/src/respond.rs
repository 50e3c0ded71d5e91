//! Error response helpers.
//!
//! Maps [`AppError`] onto the wire format every endpoint shares: an HTTP
//! status plus `{ "error": <stable code>, "message": <detail> }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use civitrack_shared::AppError;

/// Renders an application error as a JSON response.
pub fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code().to_ascii_lowercase(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

/// Shorthand for an internal server error with a generic message.
pub fn internal_error(message: &str) -> Response {
    error_response(&AppError::Internal(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_error_variant() {
        let response = error_response(&AppError::NotFound("session".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_response(&AppError::InvalidOperation("nope".into()));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = internal_error("boom");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
