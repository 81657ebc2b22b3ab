use common::errors::FetchError;
use common::http_client::HttpClient;
use common::models::WeatherSnapshot;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct OpenWeatherMapResponse {
    main: MainReadings,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

impl From<OpenWeatherMapResponse> for WeatherSnapshot {
    fn from(response: OpenWeatherMapResponse) -> Self {
        WeatherSnapshot {
            temperature: response.main.temp,
            humidity: response.main.humidity,
            wind_speed: response.wind.speed,
        }
    }
}

/// Client for the OpenWeatherMap current-weather endpoint, always in metric units.
pub struct OpenWeatherMapClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMapClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http_client: HttpClient::new(timeout)?,
            base_url,
            api_key,
        })
    }

    #[instrument(skip(self))]
    pub async fn current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, FetchError> {
        info!("Fetching weather by coordinates from API");

        let url = format!(
            "{}?lat={}&lon={}&appid={}&units=metric",
            self.base_url,
            latitude,
            longitude,
            urlencoding::encode(&self.api_key)
        );
        let label = format!("weather lat={} lon={}", latitude, longitude);

        let response: OpenWeatherMapResponse = self.http_client.get_json(&url, &label).await?;
        Ok(response.into())
    }

    #[instrument(skip(self), fields(place = %name))]
    pub async fn current_by_name(&self, name: &str) -> Result<WeatherSnapshot, FetchError> {
        info!("Fetching weather by name from API");

        let url = format!(
            "{}?q={}&appid={}&units=metric",
            self.base_url,
            encode_place_name(name),
            urlencoding::encode(&self.api_key)
        );
        let label = format!("weather q={}", name);

        let response: OpenWeatherMapResponse = self.http_client.get_json(&url, &label).await?;
        Ok(response.into())
    }
}

/// Spaces become `+`, everything else reserved is percent-encoded.
fn encode_place_name(name: &str) -> String {
    name.split(' ')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}
