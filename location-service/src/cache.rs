use common::models::WeatherSnapshot;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

struct CacheEntry {
    data: WeatherSnapshot,
    fetched_at: Instant,
}

/// Last fetched snapshot per location id.
pub struct WeatherCache {
    cache: RwLock<HashMap<u64, CacheEntry>>,
    ttl: Duration,
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn with_ttl(ttl_seconds: u64) -> Self {
        Self::new(Duration::from_secs(ttl_seconds))
    }

    /// Returns the entry while it is at most `ttl` old. Stale entries stay in
    /// place until the next `set` overwrites them.
    pub async fn get(&self, location_id: u64) -> Option<WeatherSnapshot> {
        let cache = self.cache.read().await;
        if let Some(entry) = cache.get(&location_id)
            && entry.fetched_at.elapsed() <= self.ttl
        {
            return Some(entry.data.clone());
        }
        None
    }

    pub async fn set(&self, location_id: u64, data: WeatherSnapshot) {
        let mut cache = self.cache.write().await;
        cache.insert(
            location_id,
            CacheEntry {
                data,
                fetched_at: Instant::now(),
            },
        );
    }

    pub async fn remove(&self, location_id: u64) {
        self.cache.write().await.remove(&location_id);
    }
}
