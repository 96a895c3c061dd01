//! Custom error types for the storefront API

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the storefront API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or rejected credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Authenticated, but not allowed to touch the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// One or more request fields failed validation
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Some of the supplied product ids are not well-formed
    #[error("Invalid product ids: {}", .0.join(", "))]
    InvalidIds(Vec<String>),

    /// Some of the supplied products belong to someone else
    #[error("Products not owned by caller: {}", .0.join(", "))]
    NotOwned(Vec<String>),

    /// Caller exceeded the attempt budget
    #[error("Too many requests")]
    TooManyRequests,

    /// A dependency (exchange rates, mail) is not answering
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            ApiError::InvalidIds(ids) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "One or more invalid product IDs provided",
                    "invalidIds": ids,
                }),
            ),
            ApiError::NotOwned(ids) => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "You are not authorized to delete some of the requested products",
                    "unauthorizedIds": ids,
                }),
            ),
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "Too many attempts. Please try again later." }),
            ),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": msg }))
            }
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_details() {
        let (status, body) = render(ApiError::Validation(vec![
            "Username is required".to_string(),
            "Email is required".to_string(),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][1], "Email is required");
    }

    #[tokio::test]
    async fn not_owned_reports_ids() {
        let (status, body) = render(ApiError::NotOwned(vec!["abc".to_string()])).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["unauthorizedIds"][0], "abc");
    }

    #[tokio::test]
    async fn database_details_stay_private() {
        let (status, body) = render(ApiError::Database(
            common::error::DatabaseError::Migration("boom".to_string()),
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database error");
    }
}
