//! Restaurant search route handler.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use calorie_quest_core::{GeoPoint, Restaurant};

use crate::error::{AppError, Result};
use crate::services::SearchService;
use crate::state::AppState;

/// Default search radius in miles.
const DEFAULT_MILEAGE: u32 = 5;

const fn default_mileage() -> u32 {
    DEFAULT_MILEAGE
}

/// Query string of `GET /restaurants/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub lat: f64,
    pub lng: f64,
    /// Radius in whole miles.
    #[serde(default = "default_mileage")]
    pub mileage: u32,
    pub max_calories: Option<i32>,
}

/// `GET /restaurants/search` - restaurants near a point, optionally
/// restricted to menu items under a calorie ceiling.
pub async fn search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Restaurant>>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let point =
        GeoPoint::new(params.lat, params.lng).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let restaurants = SearchService::new(state.restaurants())
        .search(&point, f64::from(params.mileage), params.max_calories)
        .await?;

    tracing::info!(
        mileage = params.mileage,
        max_calories = ?params.max_calories,
        results = restaurants.len(),
        "Restaurant search"
    );

    Ok(Json(restaurants))
}
