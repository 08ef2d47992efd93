use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use reqwest::Client;
use std::fmt::Debug;

use crate::{Config, Coordinates, RawSeries, error::FetchError, model::DateKey};

pub mod power;

pub use power::PowerFetcher;

/// Number of days covered by one fetch, today included.
pub const WINDOW_DAYS: i64 = 10;

/// Retrieves a daily history for one position. Single attempt; retrying is
/// left to the pipeline.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(&self, coords: Coordinates) -> Result<RawSeries, FetchError>;
}

/// Inclusive range of days requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateKey,
    pub end: DateKey,
}

impl DateWindow {
    /// `days` days ending on `today`, inclusive.
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        let start = today - Duration::days(days - 1);
        Self {
            start: DateKey::from_date(start),
            end: DateKey::from_date(today),
        }
    }

    /// The standard window ending today (UTC).
    pub fn ending_today() -> Self {
        Self::trailing(Utc::now().date_naive(), WINDOW_DAYS)
    }
}

/// Construct the weather fetcher configured in `config`.
pub fn fetcher_from_config(config: &Config, http: Client) -> Box<dyn WeatherFetcher> {
    Box::new(PowerFetcher::new(http, config.endpoints.power.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_spans_ten_days() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let window = DateWindow::trailing(today, WINDOW_DAYS);

        assert_eq!(window.start.to_string(), "20240106");
        assert_eq!(window.end.to_string(), "20240115");
    }

    #[test]
    fn trailing_window_crosses_month_and_year() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let window = DateWindow::trailing(today, WINDOW_DAYS);

        assert_eq!(window.start.to_string(), "20231225");
        assert_eq!(window.end.to_string(), "20240103");
    }

    #[test]
    fn window_ending_today_ends_on_the_utc_date() {
        let window = DateWindow::ending_today();
        let today = Utc::now().date_naive();

        // Tolerate a UTC midnight rollover between the two calls.
        assert!(window.end.date() == today || window.end.date() + Duration::days(1) == today);
        assert_eq!(window.end.date() - window.start.date(), Duration::days(WINDOW_DAYS - 1));
    }
}
