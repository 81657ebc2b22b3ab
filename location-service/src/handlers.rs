use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::errors::{AppError, FetchError};
use common::models::{
    HistoryResponse, Location, LocationUpdate, MessageResponse, NewLocation, WeatherSnapshot,
};
use std::sync::Arc;
use tracing::info;

use crate::api_client::OpenWeatherMapClient;
use crate::cache::WeatherCache;
use crate::config::Config;
use crate::history::{HistorySource, InMemoryHistory};
use crate::store::LocationStore;
use crate::weather::WeatherService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LocationStore>,
    pub weather: Arc<WeatherService>,
}

impl AppState {
    /// Wires the stores and provider client from configuration, with an
    /// in-memory history.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::with_parts(
            config,
            Arc::new(WeatherCache::new(config.cache_ttl())),
            Arc::new(InMemoryHistory::new()),
        )
    }

    pub fn with_parts(
        config: &Config,
        cache: Arc<WeatherCache>,
        history: Arc<dyn HistorySource>,
    ) -> Result<Self, FetchError> {
        let store = Arc::new(LocationStore::new());
        let client = Arc::new(OpenWeatherMapClient::new(
            config.open_weather_map_url.clone(),
            config.api_key.clone(),
            config.http_timeout(),
        )?);
        let weather = Arc::new(WeatherService::new(store.clone(), cache, client, history));

        Ok(Self { store, weather })
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "location-service" }))
}

#[utoipa::path(
    get,
    path = "/locations",
    responses(
        (status = 200, description = "All tracked locations", body = Vec<Location>),
        (status = 429, description = "Rate limit exceeded")
    ),
    tag = "locations"
)]
pub async fn list_locations(State(state): State<AppState>) -> Json<Vec<Location>> {
    Json(state.store.list().await)
}

#[utoipa::path(
    post,
    path = "/locations",
    request_body = NewLocation,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 422, description = "Missing or mistyped field"),
        (status = 429, description = "Rate limit exceeded")
    ),
    tag = "locations"
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<NewLocation>,
) -> (StatusCode, Json<Location>) {
    let location = state.store.create(payload).await;

    info!(location_id = location.id, name = %location.name, "Location created");

    (StatusCode::CREATED, Json(location))
}

#[utoipa::path(
    get,
    path = "/locations/{id}",
    params(
        ("id" = String, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location details", body = Location),
        (status = 404, description = "Location not found")
    ),
    tag = "locations"
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Location>, AppError> {
    Ok(Json(state.store.get(&id).await?))
}

#[utoipa::path(
    put,
    path = "/locations/{id}",
    params(
        ("id" = String, Path, description = "Location ID")
    ),
    request_body = LocationUpdate,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 404, description = "Location not found")
    ),
    tag = "locations"
)]
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<LocationUpdate>,
) -> Result<Json<Location>, AppError> {
    let location = state.store.update(&id, payload).await?;

    info!(location_id = location.id, "Location updated");

    Ok(Json(location))
}

#[utoipa::path(
    delete,
    path = "/locations/{id}",
    params(
        ("id" = String, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location deleted", body = MessageResponse),
        (status = 404, description = "Location not found")
    ),
    tag = "locations"
)]
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.store.delete(&id).await?;
    state.weather.forget(removed.id).await;

    info!(location_id = removed.id, "Location deleted");

    Ok(Json(MessageResponse::new("Location Deleted Successfully")))
}

#[utoipa::path(
    get,
    path = "/weather/{id}",
    params(
        ("id" = String, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Current weather at the location", body = WeatherSnapshot),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Weather provider call failed")
    ),
    tag = "weather"
)]
pub async fn get_weather_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WeatherSnapshot>, AppError> {
    info!(location_id = %id, "Weather request received");

    Ok(Json(state.weather.for_location(&id).await?))
}

#[utoipa::path(
    get,
    path = "/weather/{name}",
    params(
        ("name" = String, Path, description = "Free-text place name")
    ),
    responses(
        (status = 200, description = "Current weather for the place", body = WeatherSnapshot),
        (status = 500, description = "Weather provider call failed")
    ),
    tag = "weather"
)]
pub async fn get_weather_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<WeatherSnapshot>, AppError> {
    info!(place = %name, "Weather request received");

    Ok(Json(state.weather.for_place_name(&name).await?))
}

#[utoipa::path(
    get,
    path = "/history/{id}",
    params(
        ("id" = String, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Recorded observations and their summary", body = HistoryResponse),
        (status = 404, description = "Location not found")
    ),
    tag = "history"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    Ok(Json(state.weather.history(&id).await?))
}
