//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Error responses are JSON
//! bodies of the form `{"detail": "<message>"}`; server-side failures are
//! captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{AuthError, SearchError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// A store collaborator is unreachable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The external identity provider rejected or could not validate a token.
    /// Carries the client-facing message.
    #[error("{0}")]
    InvalidCredential(String),

    /// Unexpected fault from a store query; the message is returned as-is.
    #[error("{0}")]
    Upstream(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(reason) => {
                Self::InvalidCredential(format!("Invalid Google token: {reason}"))
            }
            AuthError::ProviderFailure(reason) => {
                Self::InvalidCredential(format!("Google authentication failed: {reason}"))
            }
            AuthError::StoreUnavailable(reason) => Self::ServiceUnavailable(reason),
            AuthError::Repository(err) => Self::Upstream(err.to_string()),
            AuthError::Token(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Unavailable(reason) => Self::ServiceUnavailable(reason),
            SearchError::Query(message) => Self::Upstream(message),
        }
    }
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidCredential(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let detail = match &self {
            Self::ServiceUnavailable(_) => "Database connection not available".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::InvalidCredential(_) | Self::Upstream(_) => self.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context once an identity has been resolved.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_codes_and_detail_bodies() {
        let (status, json) = body(AppError::ServiceUnavailable("pool closed".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["detail"], "Database connection not available");

        let (status, json) = body(AppError::Upstream("spatial index missing".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["detail"], "spatial index missing");

        let (status, json) = body(AppError::BadRequest("lat out of range".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "lat out of range");

        let (status, json) = body(AppError::Internal("secret detail".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["detail"], "Internal server error");
    }

    #[tokio::test]
    async fn test_auth_errors_map_to_google_messages() {
        let (status, json) = body(AuthError::InvalidToken("status 401".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Invalid Google token: status 401");

        let (status, json) = body(AuthError::ProviderFailure("timed out".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Google authentication failed: timed out");

        let err: AppError = AuthError::StoreUnavailable("refused".into()).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_auth_store_fault_keeps_message() {
        let err = AuthError::from(crate::db::RepositoryError::DataCorruption(
            "user row has no id".into(),
        ));
        let (status, json) = body(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["detail"], "data corruption: user row has no id");
    }

    #[test]
    fn test_search_errors() {
        let err: AppError = SearchError::Unavailable("down".into()).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err: AppError = SearchError::Query("boom".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "boom");
    }
}
