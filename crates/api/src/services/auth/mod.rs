//! Identity resolution and session issuance.
//!
//! Two paths produce a session:
//!
//! - **Guest**: mint a fresh anonymous identity, persist it, sign a token.
//! - **External**: verify an opaque provider token, find or create the local
//!   identity bound to the provider's subject id, sign a token.
//!
//! Repeat external logins reuse the stored identity as-is; profile fields are
//! not refreshed from the provider.

mod error;

pub use error::AuthError;

use tracing::{info, instrument, warn};

use calorie_quest_core::{Email, UserIdentity};

use crate::db::{RepositoryError, UserStore};
use crate::google::{ExternalProfile, IdentityProvider, ProviderError};
use crate::services::tokens::{SessionClaims, SessionToken, TokenIssuer};

/// Display name used when the provider does not supply one.
pub const DEFAULT_EXTERNAL_DISPLAY_NAME: &str = "Google User";

/// A resolved identity and the token minted for it.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: UserIdentity,
    pub token: SessionToken,
}

/// Identity service.
///
/// Borrows its collaborators from the application state for the duration of
/// one request.
pub struct IdentityService<'a> {
    users: &'a dyn UserStore,
    provider: &'a dyn IdentityProvider,
    tokens: &'a TokenIssuer,
}

impl<'a> IdentityService<'a> {
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        provider: &'a dyn IdentityProvider,
        tokens: &'a TokenIssuer,
    ) -> Self {
        Self {
            users,
            provider,
            tokens,
        }
    }

    /// Create an anonymous identity and sign a guest session for it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the user store is unreachable.
    #[instrument(skip(self))]
    pub async fn issue_guest(&self) -> Result<IssuedSession, AuthError> {
        let user = UserIdentity::guest();
        self.users.create(&user).await?;

        info!(user_id = %user.id, "Guest identity created");
        self.sign(user)
    }

    /// Verify `token` with the identity provider and sign a session for the
    /// identity bound to the provider's subject id, creating it on first login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` when the provider rejects the token,
    /// `AuthError::ProviderFailure` when the provider cannot be consulted, and
    /// `AuthError::StoreUnavailable` if the user store is unreachable.
    #[instrument(skip(self, token))]
    pub async fn issue_from_external_token(&self, token: &str) -> Result<IssuedSession, AuthError> {
        let profile = self
            .provider
            .fetch_profile(token)
            .await
            .map_err(|e| match e {
                ProviderError::Rejected(reason) => AuthError::InvalidToken(reason),
                ProviderError::Verification(reason) => AuthError::ProviderFailure(reason),
            })?;

        let user = self.find_or_create(profile).await?;
        self.sign(user)
    }

    async fn find_or_create(&self, profile: ExternalProfile) -> Result<UserIdentity, AuthError> {
        if let Some(existing) = self.users.find_by_external_id(&profile.subject).await? {
            return Ok(existing);
        }

        let email = profile.email.as_deref().and_then(|raw| {
            Email::parse(raw)
                .map_err(|e| warn!(error = %e, "Discarding invalid provider email"))
                .ok()
        });
        let display_name = profile
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXTERNAL_DISPLAY_NAME.to_owned());

        let user = UserIdentity::external(profile.subject, email, display_name);
        match self.users.create(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, "External identity created");
                Ok(user)
            }
            // Lost a concurrent first login for the same subject; use the winner.
            Err(RepositoryError::Conflict(_)) => {
                let subject = user.external_id.as_deref().unwrap_or_default();
                self.users
                    .find_by_external_id(subject)
                    .await?
                    .ok_or_else(|| {
                        AuthError::Repository(RepositoryError::Conflict(
                            "external identity vanished after conflict".to_owned(),
                        ))
                    })
            }
            Err(other) => Err(other.into()),
        }
    }

    fn sign(&self, user: UserIdentity) -> Result<IssuedSession, AuthError> {
        let claims = SessionClaims {
            subject: user.id.to_string(),
            is_guest: user.is_guest,
        };
        let token = self.tokens.issue(&claims)?;
        Ok(IssuedSession { user, token })
    }
}
