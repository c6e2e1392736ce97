//! Google identity provider.
//!
//! Access tokens issued to the front-end are verified by presenting them to
//! Google's `userinfo` endpoint as a bearer credential. A 2xx response with a
//! `sub` claim is proof of identity; a non-2xx status, an undecodable body or
//! a missing `sub` is a rejection.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the credential or answered with malformed data.
    #[error("{0}")]
    Rejected(String),

    /// The provider could not be asked.
    #[error("{0}")]
    Verification(String),
}

/// Profile returned by a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    /// Provider-assigned subject id.
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Verifies opaque bearer credentials against a third party.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve `token` to the profile of the user it was issued to.
    async fn fetch_profile(&self, token: &str) -> Result<ExternalProfile, ProviderError>;
}

/// Subset of the `userinfo` response we read.
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

/// Google `userinfo` client.
#[derive(Clone)]
pub struct GoogleClient {
    client: reqwest::Client,
    userinfo_url: Url,
}

impl GoogleClient {
    #[must_use]
    pub fn new(userinfo_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            userinfo_url,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleClient {
    #[instrument(skip(self, token), fields(url = %self.userinfo_url))]
    async fn fetch_profile(&self, token: &str) -> Result<ExternalProfile, ProviderError> {
        let response = self
            .client
            .get(self.userinfo_url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::Verification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "Provider rejected token");
            return Err(ProviderError::Rejected(format!(
                "provider responded with status {}",
                status.as_u16()
            )));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| ProviderError::Rejected(format!("malformed provider response: {e}")))?;

        let subject = info
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| ProviderError::Rejected("response has no subject id".to_owned()))?;

        Ok(ExternalProfile {
            subject,
            email: info.email,
            display_name: info.name,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;

    use super::*;

    async fn userinfo(headers: HeaderMap) -> impl IntoResponse {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        match auth {
            "Bearer good" => (
                StatusCode::OK,
                Json(json!({"sub": "1234", "email": "diner@example.com", "name": "Diner"})),
            )
                .into_response(),
            "Bearer no-sub" => (StatusCode::OK, Json(json!({"email": "x@example.com"}))).into_response(),
            "Bearer garbled" => (StatusCode::OK, "not json").into_response(),
            _ => (StatusCode::UNAUTHORIZED, "invalid_token").into_response(),
        }
    }

    async fn spawn_provider() -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/userinfo", get(userinfo));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/userinfo")).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_yields_profile() {
        let client = GoogleClient::new(spawn_provider().await);
        let profile = client.fetch_profile("good").await.unwrap();
        assert_eq!(profile.subject, "1234");
        assert_eq!(profile.email.as_deref(), Some("diner@example.com"));
        assert_eq!(profile.display_name.as_deref(), Some("Diner"));
    }

    #[tokio::test]
    async fn test_non_success_is_rejected() {
        let client = GoogleClient::new(spawn_provider().await);
        let err = client.fetch_profile("bad").await.unwrap_err();
        assert!(matches!(err, ProviderError::Rejected(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_missing_subject_is_rejected() {
        let client = GoogleClient::new(spawn_provider().await);
        let err = client.fetch_profile("no-sub").await.unwrap_err();
        assert!(matches!(err, ProviderError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_rejected() {
        let client = GoogleClient::new(spawn_provider().await);
        let err = client.fetch_profile("garbled").await.unwrap_err();
        assert!(matches!(err, ProviderError::Rejected(_)));
        assert!(err.to_string().starts_with("malformed provider response"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_verification_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GoogleClient::new(Url::parse(&format!("http://{addr}/userinfo")).unwrap());
        let err = client.fetch_profile("good").await.unwrap_err();
        assert!(matches!(err, ProviderError::Verification(_)));
    }
}
