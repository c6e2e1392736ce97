//! Restaurants and their menus.
//!
//! Restaurants are created at import time and are read-only for the service.
//! A menu item's calorie count is optional: an item with no known calories
//! never satisfies a calorie ceiling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;
use super::id::{MenuItemId, RestaurantId};

/// Errors in restaurant data integrity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RestaurantError {
    #[error("menu item {item} belongs to restaurant {owner}, not {restaurant}")]
    ForeignMenuItem {
        item: MenuItemId,
        owner: RestaurantId,
        restaurant: RestaurantId,
    },
}

/// A single dish on a restaurant's menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "menu_item_id")]
    pub id: MenuItemId,
    /// Id of the restaurant whose menu contains this item.
    pub restaurant_id: RestaurantId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `None` means unknown; such items are excluded from calorie-bounded results.
    #[serde(default)]
    pub calories: Option<i32>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    #[serde(default)]
    pub carbs_g: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub sugar_g: Option<f64>,
    #[serde(rename = "created_date", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "last_modified_date", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MenuItem {
    /// Whether the item has a known calorie count no greater than `max_calories`.
    #[must_use]
    pub fn fits_within(&self, max_calories: i32) -> bool {
        self.calories.is_some_and(|calories| calories <= max_calories)
    }
}

/// A restaurant with its embedded menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(rename = "restaurant_id")]
    pub id: RestaurantId,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub chain_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Normalized point used by the spatial index.
    pub location: GeoPoint,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(rename = "created_date")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "last_modified_date")]
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// Create a restaurant with an empty menu at `location`.
    ///
    /// The plain latitude/longitude fields are derived from the point so the
    /// two representations always agree.
    #[must_use]
    pub fn new(
        id: RestaurantId,
        name: impl Into<String>,
        address: impl Into<String>,
        location: GeoPoint,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            address: address.into(),
            chain_name: None,
            latitude: location.latitude(),
            longitude: location.longitude(),
            location,
            menu_items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check that every menu item points back at this restaurant.
    ///
    /// # Errors
    ///
    /// Returns [`RestaurantError::ForeignMenuItem`] for the first item whose
    /// `restaurant_id` differs from this restaurant's id.
    pub fn check_menu_ownership(&self) -> Result<(), RestaurantError> {
        match self
            .menu_items
            .iter()
            .find(|item| item.restaurant_id != self.id)
        {
            Some(item) => Err(RestaurantError::ForeignMenuItem {
                item: item.id.clone(),
                owner: item.restaurant_id.clone(),
                restaurant: self.id.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Restrict the menu to items within `max_calories`.
    ///
    /// Returns `None` when no item qualifies: such a restaurant is dropped from
    /// calorie-bounded results rather than shown with an empty menu. Surviving
    /// items keep their original order and every other field is unchanged.
    #[must_use]
    pub fn restrict_to_calories(mut self, max_calories: i32) -> Option<Self> {
        self.menu_items.retain(|item| item.fits_within(max_calories));
        if self.menu_items.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
