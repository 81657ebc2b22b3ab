use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::models::{HistoricalRecord, HistorySummary, WeatherSnapshot};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Source of past weather observations for `/history/{id}`.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Store an observation made for a location
    async fn record(
        &self,
        location_id: u64,
        snapshot: &WeatherSnapshot,
        observed_at: DateTime<Utc>,
    );

    /// Observations for a location, oldest first
    async fn records_for(&self, location_id: u64) -> Vec<HistoricalRecord>;

    /// Drop everything recorded for a location
    async fn forget(&self, location_id: u64);
}

/// Keeps provider observations in memory until their location is forgotten.
#[derive(Default)]
pub struct InMemoryHistory {
    records: RwLock<HashMap<u64, Vec<HistoricalRecord>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistorySource for InMemoryHistory {
    async fn record(
        &self,
        location_id: u64,
        snapshot: &WeatherSnapshot,
        observed_at: DateTime<Utc>,
    ) {
        let mut records = self.records.write().await;
        records
            .entry(location_id)
            .or_default()
            .push(HistoricalRecord::new(location_id, snapshot, observed_at));
    }

    async fn records_for(&self, location_id: u64) -> Vec<HistoricalRecord> {
        let records = self.records.read().await;
        records.get(&location_id).cloned().unwrap_or_default()
    }

    async fn forget(&self, location_id: u64) {
        self.records.write().await.remove(&location_id);
    }
}

/// Averages and extremes over `records`, `None` when there is nothing to summarize.
pub fn summarize(records: &[HistoricalRecord]) -> Option<HistorySummary> {
    let first = records.first()?;
    let count = records.len() as f64;

    let mut summary = HistorySummary {
        average_temperature: 0.0,
        average_humidity: 0.0,
        average_wind_speed: 0.0,
        max_temperature: first.temperature,
        min_temperature: first.temperature,
        max_humidity: first.humidity,
        min_humidity: first.humidity,
        max_wind_speed: first.wind_speed,
        min_wind_speed: first.wind_speed,
    };

    for record in records {
        summary.average_temperature += record.temperature;
        summary.average_humidity += record.humidity;
        summary.average_wind_speed += record.wind_speed;

        summary.max_temperature = summary.max_temperature.max(record.temperature);
        summary.min_temperature = summary.min_temperature.min(record.temperature);
        summary.max_humidity = summary.max_humidity.max(record.humidity);
        summary.min_humidity = summary.min_humidity.min(record.humidity);
        summary.max_wind_speed = summary.max_wind_speed.max(record.wind_speed);
        summary.min_wind_speed = summary.min_wind_speed.min(record.wind_speed);
    }

    summary.average_temperature /= count;
    summary.average_humidity /= count;
    summary.average_wind_speed /= count;

    Some(summary)
}
