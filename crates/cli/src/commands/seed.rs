//! Seed the restaurants table from a YAML fixture.
//!
//! Seeding replaces every restaurant. Without `--file`, the built-in fixture
//! (four restaurants in downtown Los Angeles) is used.
//!
//! # Fixture format
//!
//! ```yaml
//! restaurants:
//!   - id: mcdonalds-downtown-la
//!     name: McDonald's
//!     address: 123 Main St, Los Angeles, CA 90012
//!     chain_name: McDonald's
//!     latitude: 34.052235
//!     longitude: -118.243683
//!     menu:
//!       - name: Hamburger
//!         calories: 250
//!         fat_g: 9
//! ```
//!
//! Menu item ids default to `<restaurant id>-<n>`; every item's
//! `restaurant_id` is set to the restaurant it is listed under.

use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use calorie_quest_api::db::restaurants::RestaurantRepository;
use calorie_quest_core::{GeoError, GeoPoint, MenuItem, MenuItemId, Restaurant, RestaurantId};

use super::{CommandError, connect};

/// Fixture bundled with the binary.
const BUILTIN_FIXTURE: &str = include_str!("../../fixtures/restaurants.yaml");

/// Errors loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("restaurant {id}: {source}")]
    Location { id: String, source: GeoError },

    #[error("duplicate restaurant id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Deserialize)]
struct Fixture {
    restaurants: Vec<RestaurantFixture>,
}

#[derive(Debug, Deserialize)]
struct RestaurantFixture {
    id: String,
    name: String,
    address: String,
    #[serde(default)]
    chain_name: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    menu: Vec<MenuItemFixture>,
}

#[derive(Debug, Deserialize)]
struct MenuItemFixture {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    calories: Option<i32>,
    #[serde(default)]
    fat_g: Option<f64>,
    #[serde(default)]
    carbs_g: Option<f64>,
    #[serde(default)]
    protein_g: Option<f64>,
    #[serde(default)]
    sugar_g: Option<f64>,
}

/// Parse a YAML fixture into restaurants ready to store.
///
/// # Errors
///
/// Returns `FixtureError` for malformed YAML, out-of-range coordinates, or
/// repeated restaurant ids.
pub fn parse_fixture(yaml: &str) -> Result<Vec<Restaurant>, FixtureError> {
    let fixture: Fixture = serde_yaml::from_str(yaml)?;
    let now = Utc::now();

    let mut seen = std::collections::HashSet::new();
    let mut restaurants = Vec::with_capacity(fixture.restaurants.len());

    for entry in fixture.restaurants {
        if !seen.insert(entry.id.clone()) {
            return Err(FixtureError::DuplicateId(entry.id));
        }

        let location = GeoPoint::new(entry.latitude, entry.longitude).map_err(|source| {
            FixtureError::Location {
                id: entry.id.clone(),
                source,
            }
        })?;

        let mut restaurant = Restaurant::new(
            RestaurantId::new(entry.id),
            entry.name,
            entry.address,
            location,
        );
        restaurant.chain_name = entry.chain_name;
        restaurant.created_at = now;
        restaurant.updated_at = now;
        restaurant.menu_items = entry
            .menu
            .into_iter()
            .enumerate()
            .map(|(i, item)| MenuItem {
                id: item.id.map_or_else(
                    || MenuItemId::new(format!("{}-{}", restaurant.id, i + 1)),
                    MenuItemId::new,
                ),
                restaurant_id: restaurant.id.clone(),
                name: item.name,
                description: item.description,
                calories: item.calories,
                fat_g: item.fat_g,
                carbs_g: item.carbs_g,
                protein_g: item.protein_g,
                sugar_g: item.sugar_g,
                created_at: Some(now),
                updated_at: Some(now),
            })
            .collect();

        restaurants.push(restaurant);
    }

    Ok(restaurants)
}

/// Replace all restaurants with the fixture at `file`, or the built-in one.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the database
/// write fails (in which case nothing is replaced).
pub async fn run(file: Option<&Path>) -> Result<(), CommandError> {
    // Parse before connecting so a bad fixture never touches the database
    let restaurants = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading fixture from file");
            parse_fixture(&tokio::fs::read_to_string(path).await?)?
        }
        None => {
            info!("Loading built-in fixture");
            parse_fixture(BUILTIN_FIXTURE)?
        }
    };

    let items: usize = restaurants.iter().map(|r| r.menu_items.len()).sum();
    info!(restaurants = restaurants.len(), menu_items = items, "Parsed fixture");

    let pool = connect().await?;
    let inserted = RestaurantRepository::new(pool.clone())
        .replace_all(&restaurants)
        .await?;

    info!("Seeding complete! {inserted} restaurants stored");
    pool.close().await;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_fixture() {
        let restaurants = parse_fixture(BUILTIN_FIXTURE).unwrap();
        assert_eq!(restaurants.len(), 4);

        let mcdonalds = &restaurants[0];
        assert_eq!(mcdonalds.name, "McDonald's");
        assert_eq!(mcdonalds.menu_items.len(), 11);
        assert_eq!(mcdonalds.location.coordinates(), [-118.243_683, 34.052_235]);

        let first_three: Vec<_> = mcdonalds
            .menu_items
            .iter()
            .take(3)
            .map(|i| (i.name.as_str(), i.calories))
            .collect();
        assert_eq!(
            first_three,
            [
                ("Hamburger", Some(250)),
                ("Cheeseburger", Some(300)),
                ("Big Mac", Some(550))
            ]
        );

        for restaurant in &restaurants {
            assert!(restaurant.check_menu_ownership().is_ok());
            for item in &restaurant.menu_items {
                assert_eq!(item.created_at, Some(restaurant.created_at));
                assert_eq!(item.updated_at, Some(restaurant.updated_at));
            }
        }
    }

    #[test]
    fn test_item_ids_default_to_position() {
        let yaml = r"
restaurants:
  - id: r1
    name: Diner
    address: 1 Road
    latitude: 10.0
    longitude: 20.0
    menu:
      - name: Soup
      - id: custom
        name: Salad
        calories: 120
";
        let restaurants = parse_fixture(yaml).unwrap();
        let ids: Vec<_> = restaurants[0]
            .menu_items
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, ["r1-1", "custom"]);
        assert_eq!(restaurants[0].menu_items[0].calories, None);
    }

    #[test]
    fn test_rejects_bad_coordinates_and_duplicates() {
        let bad = r"
restaurants:
  - {id: r1, name: A, address: B, latitude: 95.0, longitude: 0.0}
";
        assert!(matches!(
            parse_fixture(bad).unwrap_err(),
            FixtureError::Location { .. }
        ));

        let dup = r"
restaurants:
  - {id: r1, name: A, address: B, latitude: 1.0, longitude: 1.0}
  - {id: r1, name: C, address: D, latitude: 2.0, longitude: 2.0}
";
        assert!(matches!(
            parse_fixture(dup).unwrap_err(),
            FixtureError::DuplicateId(_)
        ));
    }
}
