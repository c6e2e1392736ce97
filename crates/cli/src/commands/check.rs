//! Report the state of the restaurant store.
//!
//! Prints the restaurant count, a sample restaurant's stored location, and
//! whether radius queries are backed by a spatial index.

use calorie_quest_api::db::restaurants::RestaurantRepository;
use calorie_quest_core::GeoPoint;
use tracing::{error, info, warn};

use super::{CommandError, connect};

/// Outcome of inspecting one stored location.
#[derive(Debug, PartialEq, Eq)]
pub enum LocationFormat {
    /// A GeoJSON point in longitude-first order.
    Point,
    Missing,
    Invalid,
}

/// Classify a stored location value.
#[must_use]
pub fn classify_location(location: Option<&serde_json::Value>) -> LocationFormat {
    match location {
        None | Some(serde_json::Value::Null) => LocationFormat::Missing,
        Some(value) => match serde_json::from_value::<GeoPoint>(value.clone()) {
            Ok(_) => LocationFormat::Point,
            Err(_) => LocationFormat::Invalid,
        },
    }
}

/// Inspect the restaurants table.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let repo = RestaurantRepository::new(pool.clone());

    let count = repo.count().await?;
    info!("Total restaurants: {count}");

    if count == 0 {
        warn!("No restaurants found. Run `cq-cli seed` to load the fixture.");
    } else if let Some(sample) = repo.sample_location().await? {
        let location = sample.location.as_ref().map(|json| &json.0);
        info!(
            "Sample restaurant: {} (location: {})",
            sample.name,
            location.map_or_else(|| "none".to_owned(), ToString::to_string)
        );

        match classify_location(location) {
            LocationFormat::Point => info!("Location format looks correct (GeoJSON Point)"),
            LocationFormat::Missing => error!("Sample restaurant has no location"),
            LocationFormat::Invalid => error!("Invalid location format, expected a GeoJSON Point"),
        }
    }

    if repo.has_spatial_index().await? {
        info!("GiST index on restaurants.location found");
    } else {
        error!("Missing GiST index on restaurants.location; radius queries will scan the table");
        error!("Run `cq-cli migrate` to create it");
    }

    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_classify_location() {
        let point = json!({"type": "Point", "coordinates": [-118.243_683, 34.052_235]});
        assert_eq!(classify_location(Some(&point)), LocationFormat::Point);
        assert_eq!(classify_location(None), LocationFormat::Missing);
        assert_eq!(
            classify_location(Some(&serde_json::Value::Null)),
            LocationFormat::Missing
        );

        let polygon = json!({"type": "Polygon", "coordinates": [[[0.0, 0.0]]]});
        assert_eq!(classify_location(Some(&polygon)), LocationFormat::Invalid);
    }
}
