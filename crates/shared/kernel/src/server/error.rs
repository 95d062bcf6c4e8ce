use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ninja_database::DatabaseError;
use ninja_domain::error::format_context;
use serde_json::json;
use std::borrow::Cow;
use tracing::error;

/// Body detail sent for failures whose cause stays server-side.
const INTERNAL_DETAIL: &str = "Internal Server Error";

/// Custom error type for the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
}

ninja_domain::error_context!(ApiErrorExt, ApiError {
    DatabaseError => Database,
});

impl From<DatabaseError> for ApiError {
    fn from(source: DatabaseError) -> Self {
        Self::Database { source, context: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::Validation { message, .. } => (StatusCode::BAD_REQUEST, message.to_string()),
            Self::Database { .. } => {
                error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_DETAIL.to_owned())
            },
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_rendered_in_display() {
        let failed: Result<(), DatabaseError> =
            Err(DatabaseError::Validation { message: "boom".into(), context: None });
        let err = failed.context("Request session").unwrap_err();
        assert!(err.to_string().starts_with("Database error (Request session): "), "{err}");
    }

    #[test]
    fn database_failures_are_internal_errors() {
        let source = DatabaseError::Validation { message: "boom".into(), context: None };
        let err = ApiError::from(source);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        let err = ApiError::Validation { message: "nope".into(), context: None };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
