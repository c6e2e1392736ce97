//! Restaurant repository backed by `PostGIS`.
//!
//! `location` is a `geography(Point, 4326)` column. Points cross the boundary
//! as GeoJSON in both directions (`ST_GeomFromGeoJSON` on the way in,
//! `ST_AsGeoJSON` on the way out) and are decoded straight into [`GeoPoint`],
//! so the longitude-first coordinate order is never rebuilt by hand.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, instrument};

use calorie_quest_core::{GeoPoint, MenuItem, Restaurant, RestaurantId};

use super::{ProximityIndex, RepositoryError};

/// Columns selected for every restaurant read.
const RESTAURANT_COLUMNS: &str = "r.id, r.name, r.address, r.chain_name, r.latitude, r.longitude, \
     ST_AsGeoJSON(r.location)::jsonb AS location, r.menu_items, r.created_at, r.updated_at";

/// Database row for `restaurants`.
#[derive(Debug, sqlx::FromRow)]
struct RestaurantRow {
    id: RestaurantId,
    name: String,
    address: String,
    chain_name: Option<String>,
    latitude: f64,
    longitude: f64,
    location: Json<GeoPoint>,
    menu_items: Json<Vec<MenuItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = RepositoryError;

    fn try_from(row: RestaurantRow) -> Result<Self, Self::Error> {
        let restaurant = Self {
            id: row.id,
            name: row.name,
            address: row.address,
            chain_name: row.chain_name,
            latitude: row.latitude,
            longitude: row.longitude,
            location: row.location.0,
            menu_items: row.menu_items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        restaurant
            .check_menu_ownership()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(restaurant)
    }
}

/// Sample location as stored, for store diagnostics.
#[derive(Debug, sqlx::FromRow)]
pub struct StoredLocation {
    pub name: String,
    pub location: Option<Json<serde_json::Value>>,
}

/// `PostgreSQL`-backed [`ProximityIndex`] plus fixture management.
#[derive(Clone)]
pub struct RestaurantRepository {
    pool: PgPool,
}

impl RestaurantRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace every restaurant with `restaurants` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a restaurant's menu items
    /// point at another restaurant, and `RepositoryError::Database` if any
    /// statement fails (nothing is committed in that case).
    #[instrument(skip(self, restaurants), fields(count = restaurants.len()))]
    pub async fn replace_all(&self, restaurants: &[Restaurant]) -> Result<u64, RepositoryError> {
        for restaurant in restaurants {
            restaurant
                .check_menu_ownership()
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM restaurants")
            .execute(&mut *tx)
            .await?;

        let mut inserted = 0;
        for restaurant in restaurants {
            let location = serde_json::to_string(&restaurant.location)
                .map_err(|e| RepositoryError::DataCorruption(format!("invalid location: {e}")))?;

            let result = sqlx::query(
                r"
                INSERT INTO restaurants
                    (id, name, address, chain_name, latitude, longitude,
                     location, menu_items, created_at, updated_at)
                VALUES
                    ($1, $2, $3, $4, $5, $6,
                     ST_SetSRID(ST_GeomFromGeoJSON($7::text), 4326)::geography,
                     $8, $9, $10)
                ",
            )
            .bind(&restaurant.id)
            .bind(&restaurant.name)
            .bind(&restaurant.address)
            .bind(restaurant.chain_name.as_deref())
            .bind(restaurant.latitude)
            .bind(restaurant.longitude)
            .bind(location)
            .bind(Json(&restaurant.menu_items))
            .bind(restaurant.created_at)
            .bind(restaurant.updated_at)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;

        Ok(inserted)
    }

    /// Number of stored restaurants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurants")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// The stored location of an arbitrary restaurant, as raw GeoJSON.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn sample_location(&self) -> Result<Option<StoredLocation>, RepositoryError> {
        let row = sqlx::query_as(
            "SELECT name, ST_AsGeoJSON(location)::jsonb AS location FROM restaurants LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Whether a `GiST` index covers `restaurants.location`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog query fails.
    pub async fn has_spatial_index(&self) -> Result<bool, RepositoryError> {
        let found: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM pg_indexes
                WHERE tablename = 'restaurants'
                  AND indexdef ILIKE '%USING gist%'
                  AND indexdef ILIKE '%(location)%'
            )
            ",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }
}

#[async_trait]
impl ProximityIndex for RestaurantRepository {
    #[instrument(skip(self), fields(lat = point.latitude(), lng = point.longitude()))]
    async fn near(
        &self,
        point: &GeoPoint,
        max_distance_meters: f64,
    ) -> Result<Vec<Restaurant>, RepositoryError> {
        let origin = serde_json::to_string(point)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid search point: {e}")))?;

        let query = format!(
            r"
            WITH origin AS (
                SELECT ST_SetSRID(ST_GeomFromGeoJSON($1::text), 4326)::geography AS point
            )
            SELECT {RESTAURANT_COLUMNS}
            FROM restaurants r, origin o
            WHERE ST_DWithin(r.location, o.point, $2)
            ORDER BY r.location <-> o.point
            "
        );

        let rows: Vec<RestaurantRow> = sqlx::query_as(&query)
            .bind(origin)
            .bind(max_distance_meters)
            .fetch_all(&self.pool)
            .await?;

        debug!(candidates = rows.len(), "Proximity query returned");

        rows.into_iter().map(Restaurant::try_from).collect()
    }
}
