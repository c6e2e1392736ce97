//! Nearby restaurant search with an optional calorie ceiling.

use thiserror::Error;
use tracing::{debug, instrument};

use calorie_quest_core::{GeoPoint, Restaurant, miles_to_meters};

use crate::db::{ProximityIndex, RepositoryError};

/// Errors from a proximity search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The proximity index could not be reached.
    #[error("search unavailable: {0}")]
    Unavailable(String),

    /// The query itself failed.
    #[error("{0}")]
    Query(String),
}

impl From<RepositoryError> for SearchError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unavailable(reason) => Self::Unavailable(reason),
            other => Self::Query(other.to_string()),
        }
    }
}

/// Radius search over a [`ProximityIndex`].
pub struct SearchService<'a> {
    index: &'a dyn ProximityIndex,
}

impl<'a> SearchService<'a> {
    #[must_use]
    pub const fn new(index: &'a dyn ProximityIndex) -> Self {
        Self { index }
    }

    /// Restaurants within `radius_miles` of `point`, in the index's order.
    ///
    /// With `max_calories`, each menu is cut down to items with a known calorie
    /// count at or under the ceiling, and restaurants left with no items are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Unavailable` if the index is unreachable and
    /// `SearchError::Query` for any other index fault.
    #[instrument(skip(self), fields(lat = point.latitude(), lng = point.longitude()))]
    pub async fn search(
        &self,
        point: &GeoPoint,
        radius_miles: f64,
        max_calories: Option<i32>,
    ) -> Result<Vec<Restaurant>, SearchError> {
        let candidates = self.index.near(point, miles_to_meters(radius_miles)).await?;
        debug!(candidates = candidates.len(), "Proximity candidates");

        Ok(match max_calories {
            None => candidates,
            Some(ceiling) => candidates
                .into_iter()
                .filter_map(|restaurant| restaurant.restrict_to_calories(ceiling))
                .collect(),
        })
    }
}
