use chrono::Utc;
use common::errors::AppError;
use common::models::{HistoryResponse, WeatherSnapshot};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::api_client::OpenWeatherMapClient;
use crate::cache::WeatherCache;
use crate::history::{HistorySource, summarize};
use crate::store::LocationStore;

pub struct WeatherService {
    store: Arc<LocationStore>,
    cache: Arc<WeatherCache>,
    client: Arc<OpenWeatherMapClient>,
    history: Arc<dyn HistorySource>,
}

impl WeatherService {
    pub fn new(
        store: Arc<LocationStore>,
        cache: Arc<WeatherCache>,
        client: Arc<OpenWeatherMapClient>,
        history: Arc<dyn HistorySource>,
    ) -> Self {
        Self {
            store,
            cache,
            client,
            history,
        }
    }

    /// Weather at a stored location's coordinates, served from cache inside the window.
    #[instrument(skip(self))]
    pub async fn for_location(&self, id: &str) -> Result<WeatherSnapshot, AppError> {
        let location = self.store.get(id).await?;

        if let Some(cached) = self.cache.get(location.id).await {
            info!(location_id = location.id, "Cache hit");
            return Ok(cached);
        }

        info!(location_id = location.id, "Cache miss, fetching from provider");

        let snapshot = self
            .client
            .current_by_coordinates(location.latitude, location.longitude)
            .await?;

        self.cache.set(location.id, snapshot.clone()).await;
        self.history.record(location.id, &snapshot, Utc::now()).await;

        // Deleted while the fetch was in flight; the delete's own forget may have run first
        if !self.store.contains(location.id).await {
            info!(location_id = location.id, "Location deleted during fetch");
            self.forget(location.id).await;
        }

        Ok(snapshot)
    }

    /// Weather for a free-text place name. Never cached.
    #[instrument(skip(self))]
    pub async fn for_place_name(&self, name: &str) -> Result<WeatherSnapshot, AppError> {
        Ok(self.client.current_by_name(name).await?)
    }

    #[instrument(skip(self))]
    pub async fn history(&self, id: &str) -> Result<HistoryResponse, AppError> {
        let location = self.store.get(id).await?;
        let historical_data = self.history.records_for(location.id).await;
        let summary = summarize(&historical_data);

        info!(
            location_id = location.id,
            records = historical_data.len(),
            "History requested"
        );

        Ok(HistoryResponse {
            historical_data,
            summary,
        })
    }

    /// Drop cached weather and recorded history for a location that no longer exists.
    pub async fn forget(&self, location_id: u64) {
        self.cache.remove(location_id).await;
        self.history.forget(location_id).await;
    }
}
