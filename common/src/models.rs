use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named point tracked by the service
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Location {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Location creation request
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct NewLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Partial location update. Absent, empty or zero fields keep the stored value.
#[derive(Debug, Serialize, Deserialize, Clone, Default, ToSchema)]
pub struct LocationUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl LocationUpdate {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude.filter(|v| is_truthy(*v))
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude.filter(|v| is_truthy(*v))
    }
}

fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Current weather reading from the provider, metric units
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Metres per second
    pub wind_speed: f64,
}

/// A weather snapshot observed for a location at a point in time
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRecord {
    pub location_id: u64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub observed_at: DateTime<Utc>,
}

impl HistoricalRecord {
    pub fn new(location_id: u64, snapshot: &WeatherSnapshot, observed_at: DateTime<Utc>) -> Self {
        Self {
            location_id,
            temperature: snapshot.temperature,
            humidity: snapshot.humidity,
            wind_speed: snapshot.wind_speed,
            observed_at,
        }
    }
}

/// Aggregates over a location's recorded history
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub average_temperature: f64,
    pub average_humidity: f64,
    pub average_wind_speed: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub max_humidity: f64,
    pub min_humidity: f64,
    pub max_wind_speed: f64,
    pub min_wind_speed: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub historical_data: Vec<HistoricalRecord>,
    pub summary: Option<HistorySummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
