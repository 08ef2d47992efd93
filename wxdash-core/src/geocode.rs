//! Reverse geocoding: coordinates to a human-readable place label.
//! Uses Nominatim (OpenStreetMap), no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, info};

use crate::Coordinates;

/// Label used whenever resolution fails for any reason.
pub const FALLBACK_PLACE_LABEL: &str = "Current Location";

/// Resolves coordinates to a place label. Never fails: problems degrade to
/// [`FALLBACK_PLACE_LABEL`].
#[async_trait]
pub trait PlaceResolver: Send + Sync + Debug {
    async fn resolve(&self, coords: Coordinates) -> String;
}

#[derive(Debug, Clone)]
pub struct NominatimResolver {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// `"{city-or-state}, {country}"`, or `None` if either part is missing.
    fn label(self) -> Option<String> {
        let place = non_empty(self.city).or_else(|| non_empty(self.state))?;
        let country = non_empty(self.country)?;
        Some(format!("{place}, {country}"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl NominatimResolver {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    async fn lookup(&self, coords: Coordinates) -> Option<String> {
        let response = match self
            .http
            .get(&self.url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        body.address?.label()
    }
}

#[async_trait]
impl PlaceResolver for NominatimResolver {
    async fn resolve(&self, coords: Coordinates) -> String {
        match self.lookup(coords).await {
            Some(label) => {
                info!("Reverse geocoded to: {}", label);
                label
            }
            None => FALLBACK_PLACE_LABEL.to_string(),
        }
    }
}
