use common::errors::AppError;
use common::models::{Location, LocationUpdate, NewLocation};
use tokio::sync::RwLock;

struct StoreInner {
    locations: Vec<Location>,
    next_id: u64,
}

/// Ordered in-memory collection of locations.
///
/// Ids come from a counter that only moves forward, so an id is never handed
/// out twice even after the location holding it is deleted.
pub struct LocationStore {
    inner: RwLock<StoreInner>,
}

impl LocationStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                locations: Vec::new(),
                next_id: 1,
            }),
        }
    }

    pub async fn list(&self) -> Vec<Location> {
        self.inner.read().await.locations.clone()
    }

    pub async fn create(&self, new: NewLocation) -> Location {
        let mut inner = self.inner.write().await;
        let location = Location {
            id: inner.next_id,
            name: new.name,
            latitude: new.latitude,
            longitude: new.longitude,
        };
        inner.next_id += 1;
        inner.locations.push(location.clone());
        location
    }

    pub async fn get(&self, id: &str) -> Result<Location, AppError> {
        let id = parse_id(id)?;
        let inner = self.inner.read().await;
        inner
            .locations
            .iter()
            .find(|loc| loc.id == id)
            .cloned()
            .ok_or_else(AppError::location_not_found)
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.inner.read().await.locations.iter().any(|loc| loc.id == id)
    }

    pub async fn update(&self, id: &str, update: LocationUpdate) -> Result<Location, AppError> {
        let id = parse_id(id)?;
        let mut inner = self.inner.write().await;
        let location = inner
            .locations
            .iter_mut()
            .find(|loc| loc.id == id)
            .ok_or_else(AppError::location_not_found)?;

        if let Some(name) = update.name() {
            location.name = name.to_string();
        }
        if let Some(latitude) = update.latitude() {
            location.latitude = latitude;
        }
        if let Some(longitude) = update.longitude() {
            location.longitude = longitude;
        }

        Ok(location.clone())
    }

    pub async fn delete(&self, id: &str) -> Result<Location, AppError> {
        let id = parse_id(id)?;
        let mut inner = self.inner.write().await;
        let index = inner
            .locations
            .iter()
            .position(|loc| loc.id == id)
            .ok_or_else(AppError::location_not_found)?;

        Ok(inner.locations.remove(index))
    }
}

impl Default for LocationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the leading integer of `id`, so `"1abc"` and `"1.5"` both name location 1.
/// Anything without leading digits can never match a stored location.
fn parse_id(id: &str) -> Result<u64, AppError> {
    let trimmed = id.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    unsigned[..digits_end]
        .parse::<u64>()
        .map_err(|_| AppError::location_not_found())
}
