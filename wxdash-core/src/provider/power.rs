use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::{
    Coordinates, RawSeries,
    error::FetchError,
    model::{DateKey, Metric},
};

use super::{DateWindow, WeatherFetcher};

/// Fill value the API uses for days it has no reading for yet.
const POWER_FILL_VALUE: f64 = -999.0;

/// NASA POWER daily point API.
#[derive(Debug, Clone)]
pub struct PowerFetcher {
    http: Client,
    url: String,
}

impl PowerFetcher {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    pub async fn fetch_window(
        &self,
        coords: Coordinates,
        window: DateWindow,
    ) -> Result<RawSeries, FetchError> {
        let parameters = Metric::all().iter().map(Metric::code).collect::<Vec<_>>().join(",");

        debug!(%coords, start = %window.start, end = %window.end, "requesting weather series");

        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("parameters", parameters),
                ("community", "RE".to_string()),
                ("longitude", coords.longitude.to_string()),
                ("latitude", coords.latitude.to_string()),
                ("start", window.start.to_string()),
                ("end", window.end.to_string()),
                ("format", "JSON".to_string()),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: self.url.clone(), source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { url: self.url.clone(), source })?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        let parsed: PowerResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::Schema(format!("response is not valid JSON: {e}")))?;

        parsed.into_series()
    }
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: Option<PowerProperties>,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: Option<HashMap<String, HashMap<String, Option<f64>>>>,
}

impl PowerResponse {
    fn into_series(self) -> Result<RawSeries, FetchError> {
        let parameter = self
            .properties
            .and_then(|p| p.parameter)
            .ok_or_else(|| FetchError::Schema("missing properties.parameter".to_string()))?;

        let mut series = RawSeries::new();
        for (code, readings) in parameter {
            let Some(metric) = Metric::from_code(&code) else {
                debug!(%code, "ignoring unrequested metric");
                continue;
            };

            for (raw_key, value) in readings {
                let date: DateKey = raw_key
                    .parse()
                    .map_err(|e| FetchError::Schema(format!("{code}: {e}")))?;

                match value {
                    Some(v) if v != POWER_FILL_VALUE => series.insert(metric, date, v),
                    _ => {}
                }
            }
        }

        Ok(series)
    }
}

#[async_trait]
impl WeatherFetcher for PowerFetcher {
    async fn fetch(&self, coords: Coordinates) -> Result<RawSeries, FetchError> {
        self.fetch_window(coords, DateWindow::ending_today()).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CAIRO: Coordinates = Coordinates::new(30.0444, 31.2357);

    fn key(s: &str) -> DateKey {
        s.parse().expect("valid date key")
    }

    fn window() -> DateWindow {
        DateWindow::trailing(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(), 10)
    }

    async fn fetch_with(response: ResponseTemplate) -> Result<RawSeries, FetchError> {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(response).mount(&server).await;

        PowerFetcher::new(Client::new(), server.uri()).fetch_window(CAIRO, window()).await
    }

    #[tokio::test]
    async fn requests_all_metrics_for_the_window() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "properties": { "parameter": {
                "T2M_MAX": { "20240110": 21.5, "20240109": 20.1 },
                "T2M_MIN": { "20240110": 11.0 },
                "WS10M": { "20240110": 3.2 },
                "PRECTOTCORR": { "20240110": 0.0 }
            }}
        });

        Mock::given(method("GET"))
            .and(query_param("parameters", "T2M_MAX,T2M_MIN,WS10M,PRECTOTCORR"))
            .and(query_param("community", "RE"))
            .and(query_param("latitude", "30.0444"))
            .and(query_param("longitude", "31.2357"))
            .and(query_param("start", "20240101"))
            .and(query_param("end", "20240110"))
            .and(query_param("format", "JSON"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let series = PowerFetcher::new(Client::new(), server.uri())
            .fetch_window(CAIRO, window())
            .await
            .expect("should parse series");

        assert_eq!(series.len(Metric::MaxTemperature), 2);
        assert_eq!(series.reading(Metric::MaxTemperature, &key("20240109")), Some(20.1));
        assert_eq!(series.reading(Metric::MinTemperature, &key("20240110")), Some(11.0));
        assert_eq!(series.reading(Metric::WindSpeed, &key("20240110")), Some(3.2));
        assert_eq!(series.reading(Metric::Precipitation, &key("20240110")), Some(0.0));
    }

    #[tokio::test]
    async fn fill_values_and_nulls_are_missing() {
        let body = serde_json::json!({
            "properties": { "parameter": {
                "T2M_MAX": { "20240110": -999.0, "20240109": 20.0 },
                "WS10M": { "20240109": null },
                "RH2M": { "20240109": 55.0 }
            }}
        });
        let series = fetch_with(ResponseTemplate::new(200).set_body_json(body)).await.unwrap();

        assert_eq!(series.len(Metric::MaxTemperature), 1);
        assert_eq!(series.reading(Metric::MaxTemperature, &key("20240110")), None);
        assert!(series.is_empty(Metric::WindSpeed));
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let err = fetch_with(ResponseTemplate::new(422).set_body_string("bad range"))
            .await
            .unwrap_err();

        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status.as_u16(), 422);
                assert_eq!(body, "bad range");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_parameter_block_is_a_schema_error() {
        for body in [
            serde_json::json!({}),
            serde_json::json!({ "properties": {} }),
            serde_json::json!({ "messages": ["no data"], "properties": null }),
        ] {
            let err = fetch_with(ResponseTemplate::new(200).set_body_json(body)).await.unwrap_err();
            assert!(err.is_schema(), "expected schema error, got {err:?}");
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_a_schema_error() {
        let err = fetch_with(ResponseTemplate::new(200).set_body_string("not json"))
            .await
            .unwrap_err();
        assert!(err.is_schema());

        let body = serde_json::json!({ "properties": { "parameter": { "T2M_MAX": { "2024-01-10": 1.0 } } } });
        let err = fetch_with(ResponseTemplate::new(200).set_body_json(body)).await.unwrap_err();
        assert!(err.is_schema());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let err = PowerFetcher::new(Client::new(), "http://127.0.0.1:9/point")
            .fetch_window(CAIRO, window())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
