//! Session issuance route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use calorie_quest_core::{Email, UserIdentity};

use crate::error::{AppError, Result, set_sentry_user};
use crate::services::{IdentityService, IssuedSession};
use crate::state::AppState;

/// Body of `POST /auth/google`.
#[derive(Debug, Deserialize)]
pub struct GoogleAuthRequest {
    /// Google OAuth access token obtained by the front-end.
    pub token: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserIdentity,
}

impl From<IssuedSession> for TokenResponse {
    fn from(session: IssuedSession) -> Self {
        Self {
            access_token: session.token.token,
            token_type: "bearer",
            user: session.user,
        }
    }
}

fn identity_service(state: &AppState) -> IdentityService<'_> {
    IdentityService::new(state.users(), state.provider(), state.tokens())
}

fn set_session_user(session: &IssuedSession) {
    set_sentry_user(&session.user.id, session.user.email.as_ref().map(Email::as_str));
}

/// `POST /auth/guest` - create an anonymous identity and sign a session.
pub async fn guest(State(state): State<AppState>) -> Result<Json<TokenResponse>> {
    let session = identity_service(&state).issue_guest().await?;
    set_session_user(&session);
    Ok(Json(session.into()))
}

/// `POST /auth/google` - exchange a Google access token for a session.
pub async fn google(
    State(state): State<AppState>,
    request: std::result::Result<Json<GoogleAuthRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(request) = request.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let session = identity_service(&state)
        .issue_from_external_token(&request.token)
        .await?;
    set_session_user(&session);
    Ok(Json(session.into()))
}
