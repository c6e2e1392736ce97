//! Core types for CalorieQuest.
//!
//! This module provides type-safe wrappers for the domain concepts shared
//! between the service and the CLI.

pub mod email;
pub mod geo;
pub mod id;
pub mod restaurant;
pub mod user;

pub use email::{Email, EmailError};
pub use geo::{GeoError, GeoPoint, METERS_PER_MILE, miles_to_meters};
pub use id::*;
pub use restaurant::{MenuItem, Restaurant, RestaurantError};
pub use user::{GUEST_DISPLAY_NAME, UserIdentity};
