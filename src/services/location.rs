use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A GPS fix reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn label(&self) -> String {
        format!("Lat: {:.4}, Lon: {:.4}", self.lat, self.lon)
    }
}

/// Best-effort place name for a coordinate pair. Treated as unreliable.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, coords: Coordinates) -> AppResult<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
}

/// Reverse lookups against a Nominatim-compatible endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    url: String,
}

impl NominatimGeocoder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fleet-ledger/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

/// Keeps the first three comma-separated parts (street, district, city).
pub fn shorten_place_name(display_name: &str) -> String {
    display_name
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .take(3)
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coords: Coordinates) -> AppResult<Option<String>> {
        let url = format!(
            "{}?format=json&lat={}&lon={}",
            self.url, coords.lat, coords.lon
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Geocoding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Internal(format!("Geocoding failed: {}", status)));
        }

        let body: NominatimResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse geocoding response: {}", e)))?;

        Ok(body
            .display_name
            .map(|name| shorten_place_name(&name))
            .filter(|name| !name.is_empty()))
    }
}

/// Resolves a trip endpoint to a display string, degrading instead of blocking:
/// place name, then the raw coordinates, then the user's own text.
pub async fn resolve_location(
    geocoder: &dyn ReverseGeocoder,
    coords: Option<Coordinates>,
    fallback: Option<&str>,
    timeout: Duration,
) -> AppResult<String> {
    if let Some(coords) = coords.filter(Coordinates::is_valid) {
        match tokio::time::timeout(timeout, geocoder.reverse(coords)).await {
            Ok(Ok(Some(place))) => return Ok(place),
            Ok(Ok(None)) => {
                tracing::warn!(lat = coords.lat, lon = coords.lon, "No place name for coordinates");
            }
            Ok(Err(e)) => {
                tracing::warn!(lat = coords.lat, lon = coords.lon, error = %e, "Reverse geocoding failed");
            }
            Err(_) => {
                tracing::warn!(
                    lat = coords.lat,
                    lon = coords.lon,
                    timeout_ms = timeout.as_millis() as u64,
                    "Reverse geocoding timed out"
                );
            }
        }
        return Ok(coords.label());
    }

    if let Some(invalid) = coords {
        tracing::warn!(lat = invalid.lat, lon = invalid.lon, "Ignoring out-of-range coordinates");
    }

    fallback
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::Validation("A location is required when GPS is unavailable".to_string())
        })
}
