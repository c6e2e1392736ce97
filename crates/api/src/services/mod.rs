//! Business logic services.
//!
//! Services borrow their collaborators from [`crate::state::AppState`] per
//! request and hold no state of their own.

pub mod auth;
pub mod search;
pub mod tokens;

pub use auth::{AuthError, IdentityService, IssuedSession};
pub use search::{SearchError, SearchService};
pub use tokens::{SessionClaims, SessionToken, SigningAlgorithm, TokenError, TokenIssuer};
