//! HTTP response types and utilities
//!
//! Every endpoint answers with the same `ApiResponse` envelope so clients can
//! check `success` before looking at `data` or `error`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, CollectionError};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(self)).into_response()
    }
}

/// Helper function to convert AppResult to HTTP response
pub fn handle_result<T>(result: AppResult<T>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(data) => ok(data).into_response(),
        Err(error) => handle_error(error),
    }
}

/// Status code an error is reported with
pub fn error_status(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Collection(CollectionError::ChannelNotFound { .. }) => StatusCode::NOT_FOUND,
        AppError::OperationInProgress { .. } => StatusCode::CONFLICT,
        AppError::Source(_) | AppError::Collection(CollectionError::Fetch(_)) => {
            StatusCode::BAD_GATEWAY
        }
        AppError::Database(_)
        | AppError::Repository(_)
        | AppError::Collection(_)
        | AppError::Configuration { .. }
        | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> Response {
    let status = error_status(&error);
    let message = match &error {
        AppError::Validation { message } => message.clone(),
        AppError::NotFound { resource, id } => {
            format!("{} with id '{}' not found", resource, id)
        }
        AppError::Collection(CollectionError::ChannelNotFound { external_id }) => {
            format!("channel with id '{}' not found", external_id)
        }
        AppError::OperationInProgress { operation_type, .. } => {
            format!("{} already in progress", operation_type)
        }
        AppError::Source(e) | AppError::Collection(CollectionError::Fetch(e)) => {
            format!("Upstream request failed: {}", e)
        }
        AppError::Database(_) | AppError::Repository(_) => "Data access failed".to_string(),
        other => other.to_string(),
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    } else {
        tracing::debug!("Request rejected: {}", error);
    }

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{RepositoryError, SourceError};
    use rstest::rstest;

    fn upstream_error() -> SourceError {
        SourceError::Http {
            status: 503,
            url: "http://upstream/epg".to_string(),
        }
    }

    #[rstest]
    #[case(AppError::validation("bad tz"), StatusCode::BAD_REQUEST)]
    #[case(AppError::not_found("channel", "7"), StatusCode::NOT_FOUND)]
    #[case(
        AppError::Collection(CollectionError::channel_not_found("7")),
        StatusCode::NOT_FOUND
    )]
    #[case(
        AppError::operation_in_progress("epg", "collector"),
        StatusCode::CONFLICT
    )]
    #[case(AppError::Source(upstream_error()), StatusCode::BAD_GATEWAY)]
    #[case(
        AppError::Collection(CollectionError::Fetch(upstream_error())),
        StatusCode::BAD_GATEWAY
    )]
    #[case(
        AppError::Repository(RepositoryError::not_found("channels", "id", "1")),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case(AppError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn errors_map_to_status_codes(#[case] error: AppError, #[case] expected: StatusCode) {
        assert_eq!(error_status(&error), expected);
        assert_eq!(handle_error(error).status(), expected);
    }

    #[test]
    fn success_envelope_omits_error() {
        let value = serde_json::to_value(ApiResponse::success(3)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], 3);
        assert!(value.get("error").is_none());
    }
}
