//! Store collaborators for the service.
//!
//! # Database: `PostgreSQL` + `PostGIS`
//!
//! ## Tables
//!
//! - `users` - Guest and externally verified identities
//! - `restaurants` - Restaurants with embedded `menu_items` (jsonb) and a
//!   `location` geography point behind a `GiST` index
//!
//! # Seams
//!
//! Handlers never see the pool directly. They go through three object-safe
//! traits held in [`crate::state::AppState`]:
//!
//! - [`UserStore`] - create and look up [`UserIdentity`] records
//! - [`ProximityIndex`] - radius queries over restaurant locations
//! - [`StoreHealth`] - connectivity probe for `/healthz`
//!
//! [`users::UserRepository`] and [`restaurants::RestaurantRepository`] are the
//! `PostgreSQL` implementations; [`memory::MemoryStore`] implements all three
//! in-process.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p calorie-quest-cli -- migrate
//! ```

pub mod memory;
pub mod restaurants;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use calorie_quest_core::{GeoPoint, Restaurant, UserIdentity};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store could not be reached (pool exhausted or closed, I/O, TLS).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate external id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::Unavailable(err.to_string())
            }
            sqlx::Error::Io(ref e) => Self::Unavailable(e.to_string()),
            sqlx::Error::Tls(ref e) => Self::Unavailable(e.to_string()),
            other => Self::Database(other),
        }
    }
}

/// Create and look up user identities.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new identity.
    ///
    /// Returns `RepositoryError::Conflict` if the id or the external id is
    /// already taken.
    async fn create(&self, user: &UserIdentity) -> Result<(), RepositoryError>;

    /// Find the identity bound to an external provider subject id.
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserIdentity>, RepositoryError>;
}

/// Nearest-point queries over restaurant locations.
#[async_trait]
pub trait ProximityIndex: Send + Sync {
    /// All restaurants within `max_distance_meters` of `point`, nearest first.
    async fn near(
        &self,
        point: &GeoPoint,
        max_distance_meters: f64,
    ) -> Result<Vec<Restaurant>, RepositoryError>;
}

/// Connectivity probe.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[async_trait]
impl StoreHealth for PgPool {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(self).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
