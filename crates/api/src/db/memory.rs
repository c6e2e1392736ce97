//! In-process store implementing every collaborator trait.
//!
//! Distances are great-circle (haversine) on a spherical Earth, which is close
//! enough to `PostGIS` geography distances for radius checks at city scale.
//! The store can be switched offline to exercise the unavailable paths.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use calorie_quest_core::{GeoPoint, Restaurant, UserIdentity};

use super::{ProximityIndex, RepositoryError, StoreHealth, UserStore};

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Great-circle distance in meters between two points.
#[must_use]
pub fn haversine_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude().to_radians(), b.latitude().to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Users and restaurants held in memory.
#[derive(Debug)]
pub struct MemoryStore {
    users: RwLock<Vec<UserIdentity>>,
    restaurants: RwLock<Vec<Restaurant>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty, reachable store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            restaurants: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// A reachable store preloaded with `restaurants`.
    #[must_use]
    pub fn with_restaurants(restaurants: Vec<Restaurant>) -> Self {
        Self {
            restaurants: RwLock::new(restaurants),
            ..Self::new()
        }
    }

    /// Take the store offline (`false`) or bring it back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Snapshot of every stored identity, in insertion order.
    pub async fn users(&self) -> Vec<UserIdentity> {
        self.users.read().await.clone()
    }

    fn ensure_available(&self) -> Result<(), RepositoryError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::Unavailable(
                "in-memory store is offline".to_owned(),
            ))
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: &UserIdentity) -> Result<(), RepositoryError> {
        self.ensure_available()?;

        let mut users = self.users.write().await;
        let taken = users.iter().any(|existing| {
            existing.id == user.id
                || (user.external_id.is_some() && existing.external_id == user.external_id)
        });
        if taken {
            return Err(RepositoryError::Conflict("user already exists".to_owned()));
        }

        users.push(user.clone());
        Ok(())
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserIdentity>, RepositoryError> {
        self.ensure_available()?;

        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.external_id.as_deref() == Some(external_id))
            .cloned())
    }
}

#[async_trait]
impl ProximityIndex for MemoryStore {
    async fn near(
        &self,
        point: &GeoPoint,
        max_distance_meters: f64,
    ) -> Result<Vec<Restaurant>, RepositoryError> {
        self.ensure_available()?;

        let restaurants = self.restaurants.read().await;
        let mut hits: Vec<(f64, &Restaurant)> = restaurants
            .iter()
            .map(|r| (haversine_meters(point, &r.location), r))
            .filter(|(distance, _)| *distance <= max_distance_meters)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(hits.into_iter().map(|(_, r)| r.clone()).collect())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.ensure_available()
    }
}
