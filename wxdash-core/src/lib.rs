//! Core library for the `wxdash` CLI.
//!
//! This crate defines:
//! - The weather pipeline: locate, reverse geocode, fetch, build day records
//! - The default-location fallback around it
//! - The chart model, the per-day chart registry and the dashboard controller
//! - Configuration and the persisted theme
//!
//! It is used by `wxdash-cli`, but the dashboard only needs a [`DashboardView`]
//! so other front ends can reuse it.

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod days;
pub mod error;
pub mod geocode;
pub mod locate;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod theme;

pub use chart::{ChartRegistry, ChartStyle, DayChart};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardView};
pub use days::{ConditionProbabilities, DayRecord, Reading, WeatherIcon, build_days};
pub use error::{BuildError, FetchError, LocateError, PipelineError};
pub use geocode::{FALLBACK_PLACE_LABEL, NominatimResolver, PlaceResolver};
pub use locate::{GeoLocator, IpLocator, StaticLocator, UnsupportedLocator, locator_from_config};
pub use model::{Coordinates, DateKey, Metric, RawSeries};
pub use pipeline::{FallbackLocation, Forecast, Stage, WeatherPipeline};
pub use provider::{DateWindow, PowerFetcher, WeatherFetcher, fetcher_from_config};
pub use theme::Theme;

/// Wire the pipeline from configuration. `explicit` coordinates bypass the
/// position provider.
pub fn pipeline_from_config(
    config: &Config,
    explicit: Option<Coordinates>,
) -> anyhow::Result<WeatherPipeline> {
    let http = config.http_client()?;

    Ok(WeatherPipeline::new(
        locator_from_config(config, http.clone(), explicit),
        Box::new(NominatimResolver::new(http.clone(), config.endpoints.reverse_geocode.clone())),
        fetcher_from_config(config, http),
        config.fallback_location(),
    ))
}
