//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::restaurants::RestaurantRepository;
use crate::db::users::UserRepository;
use crate::db::{ProximityIndex, StoreHealth, UserStore};
use crate::google::{GoogleClient, IdentityProvider};
use crate::services::TokenIssuer;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Collaborators are trait objects so the same
/// router runs against `PostgreSQL` in production and in-memory stores in tests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    users: Arc<dyn UserStore>,
    restaurants: Arc<dyn ProximityIndex>,
    health: Arc<dyn StoreHealth>,
    provider: Arc<dyn IdentityProvider>,
    tokens: TokenIssuer,
}

/// Store and provider collaborators for [`AppState::from_parts`].
pub struct Collaborators {
    pub users: Arc<dyn UserStore>,
    pub restaurants: Arc<dyn ProximityIndex>,
    pub health: Arc<dyn StoreHealth>,
    pub provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Wire the `PostgreSQL` repositories and the Google client.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let provider = GoogleClient::new(config.google_userinfo_url.clone());
        let collaborators = Collaborators {
            users: Arc::new(UserRepository::new(pool.clone())),
            restaurants: Arc::new(RestaurantRepository::new(pool.clone())),
            health: Arc::new(pool),
            provider: Arc::new(provider),
        };
        Self::from_parts(config, collaborators)
    }

    /// Build state from explicit collaborators.
    #[must_use]
    pub fn from_parts(config: ApiConfig, collaborators: Collaborators) -> Self {
        let tokens = TokenIssuer::new(&config.token);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                users: collaborators.users,
                restaurants: collaborators.restaurants,
                health: collaborators.health,
                provider: collaborators.provider,
                tokens,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    #[must_use]
    pub fn restaurants(&self) -> &dyn ProximityIndex {
        self.inner.restaurants.as_ref()
    }

    #[must_use]
    pub fn health(&self) -> &dyn StoreHealth {
        self.inner.health.as_ref()
    }

    #[must_use]
    pub fn provider(&self) -> &dyn IdentityProvider {
        self.inner.provider.as_ref()
    }

    /// Session token issuer keyed with the configured secret.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }
}
