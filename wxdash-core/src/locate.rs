//! One-shot position acquisition.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::debug;

use crate::{Config, Coordinates, error::LocateError};

/// Single attempt at finding the user's position. Implementations never retry.
#[async_trait]
pub trait GeoLocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocateError>;
}

/// Position derived from the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl GeoLocator for IpLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        debug!(url = %self.url, "requesting position");

        let res = self.http.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LocateError::PermissionOrTimeout("position request timed out".to_string())
            } else {
                LocateError::PermissionOrTimeout(format!("position unavailable: {e}"))
            }
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocateError::PermissionOrTimeout(format!(
                "position provider returned status {status}"
            )));
        }

        let body: IpApiResponse = res.json().await.map_err(|e| {
            LocateError::PermissionOrTimeout(format!("malformed position response: {e}"))
        })?;

        if body.status != "success" {
            return Err(LocateError::PermissionOrTimeout(
                body.message.unwrap_or_else(|| "position unavailable".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
            _ => Err(LocateError::PermissionOrTimeout(
                "position response carried no coordinates".to_string(),
            )),
        }
    }
}

/// Coordinates supplied up front, e.g. on the command line.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocator(pub Coordinates);

#[async_trait]
impl GeoLocator for StaticLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        Ok(self.0)
    }
}

/// Positioning is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocator;

#[async_trait]
impl GeoLocator for UnsupportedLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        Err(LocateError::Unsupported)
    }
}

/// Explicit coordinates win; otherwise the configured provider, if enabled.
pub fn locator_from_config(
    config: &Config,
    http: Client,
    explicit: Option<Coordinates>,
) -> Box<dyn GeoLocator> {
    match explicit {
        Some(coords) => Box::new(StaticLocator(coords)),
        None if config.locator.enabled => {
            Box::new(IpLocator::new(http, config.endpoints.ip_locate.clone()))
        }
        None => Box::new(UnsupportedLocator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn locate_against(body: ResponseTemplate) -> Result<Coordinates, LocateError> {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(body).mount(&server).await;

        IpLocator::new(Client::new(), server.uri()).locate().await
    }

    #[tokio::test]
    async fn ip_locator_returns_coordinates() {
        let body = serde_json::json!({ "status": "success", "lat": 48.8566, "lon": 2.3522 });
        let coords = locate_against(ResponseTemplate::new(200).set_body_json(body))
            .await
            .expect("position should resolve");

        assert_eq!(coords, Coordinates::new(48.8566, 2.3522));
    }

    #[tokio::test]
    async fn ip_locator_reports_provider_failure() {
        let body = serde_json::json!({ "status": "fail", "message": "private range" });
        let err = locate_against(ResponseTemplate::new(200).set_body_json(body))
            .await
            .unwrap_err();

        assert!(matches!(err, LocateError::PermissionOrTimeout(ref m) if m == "private range"));
    }

    #[tokio::test]
    async fn ip_locator_rejects_non_success_status() {
        let err = locate_against(ResponseTemplate::new(503)).await.unwrap_err();
        assert!(matches!(err, LocateError::PermissionOrTimeout(ref m) if m.contains("503")));
    }

    #[tokio::test]
    async fn ip_locator_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let http = Client::builder()
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap();
        let err = IpLocator::new(http, server.uri()).locate().await.unwrap_err();

        assert!(matches!(err, LocateError::PermissionOrTimeout(ref m) if m.contains("timed out")));
    }

    #[tokio::test]
    async fn disabled_locator_is_unsupported() {
        let mut cfg = Config::default();
        cfg.locator.enabled = false;

        let err = locator_from_config(&cfg, Client::new(), None).locate().await.unwrap_err();
        assert!(matches!(err, LocateError::Unsupported));
    }

    #[tokio::test]
    async fn explicit_coordinates_take_priority() {
        let mut cfg = Config::default();
        cfg.locator.enabled = false;
        let coords = Coordinates::new(-33.8688, 151.2093);

        let located = locator_from_config(&cfg, Client::new(), Some(coords)).locate().await.unwrap();
        assert_eq!(located, coords);
    }
}
