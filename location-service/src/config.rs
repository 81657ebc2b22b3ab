use common::tracing::LogFormat;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OPEN_WEATHER_MAP_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// How `/weather/{..}` resolves the place to query the provider for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherLookup {
    /// By stored location id, using its coordinates, with caching
    #[default]
    Coordinates,
    /// By free-text place name, uncached, with CORS enabled
    Name,
}

impl FromStr for WeatherLookup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coordinates" | "id" => Ok(WeatherLookup::Coordinates),
            "name" => Ok(WeatherLookup::Name),
            other => Err(format!("unknown weather lookup '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_key: String,
    pub open_weather_map_url: String,
    pub cache_ttl_seconds: u64,
    pub http_timeout_seconds: u64,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_seconds: u64,
    pub weather_lookup: WeatherLookup,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = get("OPEN_WEATHER_MAP_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("OPEN_WEATHER_MAP_API_KEY"))?;

        let weather_lookup = match get("WEATHER_LOOKUP") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                name: "WEATHER_LOOKUP",
                reason,
            })?,
            None => WeatherLookup::default(),
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                name: "LOG_FORMAT",
                reason,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            port: get("PORT").and_then(|p| p.parse().ok()).unwrap_or(3000),
            api_key,
            open_weather_map_url: get("OPEN_WEATHER_MAP_URL")
                .unwrap_or_else(|| DEFAULT_OPEN_WEATHER_MAP_URL.to_string()),
            cache_ttl_seconds: get("CACHE_TTL_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600), // 1 hour
            http_timeout_seconds: get("HTTP_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            rate_limit_max_requests: get("RATE_LIMIT_MAX_REQUESTS")
                .and_then(|r| r.parse().ok())
                .unwrap_or(100),
            rate_limit_window_seconds: get("RATE_LIMIT_WINDOW_SECONDS")
                .and_then(|r| r.parse().ok())
                .unwrap_or(15 * 60),
            weather_lookup,
            log_format,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }
}
