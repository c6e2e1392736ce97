//! In-process application fixtures for router tests.

#![allow(clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

use calorie_quest_core::{GeoPoint, MenuItem, MenuItemId, Restaurant, RestaurantId};

use crate::config::{ApiConfig, DEFAULT_GOOGLE_USERINFO_URL, TokenConfig};
use crate::db::memory::MemoryStore;
use crate::google::{ExternalProfile, IdentityProvider, ProviderError};
use crate::routes;
use crate::services::SigningAlgorithm;
use crate::state::{AppState, Collaborators};

/// Provider that accepts `valid`, fails to connect on `unreachable` and
/// rejects everything else.
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn fetch_profile(&self, token: &str) -> Result<ExternalProfile, ProviderError> {
        match token {
            "valid" => Ok(ExternalProfile {
                subject: "google-sub-1".to_owned(),
                email: Some("diner@example.com".to_owned()),
                display_name: Some("Diner".to_owned()),
            }),
            "unreachable" => Err(ProviderError::Verification(
                "error sending request".to_owned(),
            )),
            _ => Err(ProviderError::Rejected(
                "provider responded with status 401".to_owned(),
            )),
        }
    }
}

pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        token: TokenConfig {
            secret: SecretString::from("q8V#t2Lm!Rz7@Kp4^Xw9&Bn3*Hd6$Jf0"),
            algorithm: SigningAlgorithm::Hs256,
            ttl_minutes: 30,
        },
        google_userinfo_url: Url::parse(DEFAULT_GOOGLE_USERINFO_URL).unwrap(),
        cors_origins: vec!["http://localhost:5173".to_owned()],
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A downtown LA restaurant with items of 250, 300 and 550 calories, plus one
/// in San Francisco well outside any test radius.
pub fn la_restaurants() -> Vec<Restaurant> {
    let mut mcdonalds = Restaurant::new(
        RestaurantId::new("mcdonalds-downtown-la"),
        "McDonald's",
        "123 Main St, Los Angeles, CA 90012",
        GeoPoint::new(34.052_235, -118.243_683).unwrap(),
    );
    mcdonalds.chain_name = Some("McDonald's".to_owned());
    mcdonalds.menu_items = [("Hamburger", 250), ("Cheeseburger", 300), ("Big Mac", 550)]
        .into_iter()
        .enumerate()
        .map(|(i, (name, calories))| MenuItem {
            id: MenuItemId::new(format!("mcdonalds-item-{i}")),
            restaurant_id: mcdonalds.id.clone(),
            name: name.to_owned(),
            description: None,
            calories: Some(calories),
            fat_g: None,
            carbs_g: None,
            protein_g: None,
            sugar_g: None,
            created_at: None,
            updated_at: None,
        })
        .collect();

    let sf = Restaurant::new(
        RestaurantId::new("sf-diner"),
        "SF Diner",
        "1 Market St, San Francisco, CA",
        GeoPoint::new(37.7749, -122.4194).unwrap(),
    );

    vec![mcdonalds, sf]
}

/// Application wired to a [`MemoryStore`] and a [`StubProvider`].
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn seeded() -> Self {
        Self::with_store(MemoryStore::with_restaurants(la_restaurants()))
    }

    fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let state = AppState::from_parts(
            test_config(),
            Collaborators {
                users: store.clone(),
                restaurants: store.clone(),
                health: store.clone(),
                provider: Arc::new(StubProvider),
            },
        );
        Self { store, state }
    }

    pub fn router(&self) -> Router {
        routes::app(self.state.clone())
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn post_json(router: &Router, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(Method::POST).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send(router, request).await
}
