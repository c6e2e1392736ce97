//! Identity resolution error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::tokens::TokenError;

/// Errors that can occur while resolving an identity and issuing its session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider rejected the external token or returned malformed data.
    #[error("invalid external token: {0}")]
    InvalidToken(String),

    /// The provider could not be consulted.
    #[error("external verification failed: {0}")]
    ProviderFailure(String),

    /// The user store could not be reached.
    #[error("identity store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other user store fault.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// Session token could not be minted.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unavailable(reason) => Self::StoreUnavailable(reason),
            other => Self::Repository(other),
        }
    }
}
