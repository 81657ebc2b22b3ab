use crate::errors::FetchError;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// HTTP client with a bounded timeout. Failed calls are reported once, never retried.
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, timeout })
    }

    pub fn with_timeout_secs(timeout_secs: u64) -> Result<Self, FetchError> {
        Self::new(Duration::from_secs(timeout_secs))
    }

    /// Fetch JSON from URL. `label` is what gets logged in place of the URL,
    /// which may carry credentials in its query string.
    #[instrument(skip(self, url))]
    pub async fn get_json<T>(&self, url: &str, label: &str) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.fetch_with_timeout(url, label).await {
            Ok(response) => {
                info!("Request successful");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Request failed");
                Err(e)
            }
        }
    }

    async fn fetch_with_timeout<T>(&self, url: &str, label: &str) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| FetchError::timeout(format!("Request to {} timed out", label)))?
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::timeout(format!("Request to {} timed out", label))
                } else {
                    FetchError::Network(e.without_url())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http(
                status.as_u16(),
                format!("HTTP error: {}", status),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.without_url()))?;
        let json: T = serde_json::from_str(&text)?;

        Ok(json)
    }
}
