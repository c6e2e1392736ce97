//! Integration tests for CalorieQuest.
//!
//! These tests talk to a running API server over HTTP and are ignored by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare the database
//! cargo run -p calorie-quest-cli -- migrate
//! cargo run -p calorie-quest-cli -- seed
//!
//! # Start the server
//! cargo run -p calorie-quest-api
//!
//! # Run integration tests
//! cargo test -p calorie-quest-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - Server under test (default: `http://localhost:8000`)
//! - `API_TOKEN_SECRET` - When set, issued tokens are also verified locally
//! - `GOOGLE_TEST_TOKEN` - A live Google access token for the happy-path login test

use calorie_quest_api::config::TokenConfig;
use calorie_quest_api::services::{SessionClaims, SigningAlgorithm, TokenError, TokenIssuer};
use secrecy::SecretString;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Verify `token` with the server's secret, if the secret is available here.
///
/// Returns `None` when `API_TOKEN_SECRET` is not set.
#[must_use]
pub fn verify_with_server_secret(token: &str) -> Option<Result<SessionClaims, TokenError>> {
    let secret = std::env::var("API_TOKEN_SECRET").ok()?;
    let algorithm = std::env::var("API_TOKEN_ALGORITHM")
        .ok()
        .and_then(|alg| alg.parse().ok())
        .unwrap_or(SigningAlgorithm::Hs256);

    let issuer = TokenIssuer::new(&TokenConfig {
        secret: SecretString::from(secret),
        algorithm,
        ttl_minutes: 30,
    });
    Some(issuer.verify(token))
}
