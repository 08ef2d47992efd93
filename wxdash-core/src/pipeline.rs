//! Locate, resolve, fetch and build, with a single fallback location.

use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::{
    Coordinates,
    days::{DayRecord, build_days},
    error::{BuildError, FetchError, PipelineError},
    geocode::PlaceResolver,
    locate::GeoLocator,
    provider::WeatherFetcher,
};

/// Where the pipeline goes when the user's own position cannot be used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackLocation {
    pub coords: Coordinates,
    pub label: String,
}

impl Default for FallbackLocation {
    fn default() -> Self {
        Self {
            coords: Coordinates::new(30.0444, 31.2357),
            label: "Cairo, Egypt (Default)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Locating,
    Resolving,
    Fetching,
    Fallback,
    Rendered,
    TerminalFailure,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Locating => "locating",
            Stage::Resolving => "resolving",
            Stage::Fetching => "fetching",
            Stage::Fallback => "fallback",
            Stage::Rendered => "rendered",
            Stage::TerminalFailure => "terminal-failure",
        };
        f.write_str(name)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub coords: Coordinates,
    pub place: String,
    pub days: Vec<DayRecord>,
    pub used_fallback: bool,
}

enum FetchFailure {
    Fetch(FetchError),
    Empty,
}

#[derive(Debug)]
pub struct WeatherPipeline {
    locator: Box<dyn GeoLocator>,
    resolver: Box<dyn PlaceResolver>,
    fetcher: Box<dyn WeatherFetcher>,
    fallback: FallbackLocation,
}

impl WeatherPipeline {
    pub fn new(
        locator: Box<dyn GeoLocator>,
        resolver: Box<dyn PlaceResolver>,
        fetcher: Box<dyn WeatherFetcher>,
        fallback: FallbackLocation,
    ) -> Self {
        Self { locator, resolver, fetcher, fallback }
    }

    pub async fn run(&self) -> Result<Forecast, PipelineError> {
        self.run_observed(|stage| debug!(%stage, "pipeline stage")).await
    }

    /// Like [`run`](Self::run), reporting every stage entered to `on_stage`.
    pub async fn run_observed<F>(&self, mut on_stage: F) -> Result<Forecast, PipelineError>
    where
        F: FnMut(Stage) + Send,
    {
        on_stage(Stage::Idle);
        on_stage(Stage::Locating);

        match self.locator.locate().await {
            Ok(coords) => {
                on_stage(Stage::Resolving);
                let place = self.resolver.resolve(coords).await;

                on_stage(Stage::Fetching);
                match self.fetch_days(coords).await {
                    Ok(days) => {
                        on_stage(Stage::Rendered);
                        return Ok(Forecast { coords, place, days, used_fallback: false });
                    }
                    Err(FetchFailure::Empty) => {
                        on_stage(Stage::TerminalFailure);
                        return Err(PipelineError::NoData);
                    }
                    Err(FetchFailure::Fetch(e)) => {
                        warn!(error = %e, %coords, "weather fetch failed, using default location");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "could not get location, using default location");
            }
        }

        on_stage(Stage::Fallback);
        let FallbackLocation { coords, label } = self.fallback.clone();

        on_stage(Stage::Fetching);
        match self.fetch_days(coords).await {
            Ok(days) => {
                on_stage(Stage::Rendered);
                Ok(Forecast { coords, place: label, days, used_fallback: true })
            }
            Err(FetchFailure::Empty) => {
                on_stage(Stage::TerminalFailure);
                Err(PipelineError::NoData)
            }
            Err(FetchFailure::Fetch(e)) => {
                warn!(error = %e, "fallback fetch failed");
                on_stage(Stage::TerminalFailure);
                Err(PipelineError::DefaultLocationUnavailable(e))
            }
        }
    }

    async fn fetch_days(&self, coords: Coordinates) -> Result<Vec<DayRecord>, FetchFailure> {
        let series = self.fetcher.fetch(coords).await.map_err(FetchFailure::Fetch)?;
        build_days(&series).map_err(|BuildError::EmptySeries| FetchFailure::Empty)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use crate::{
        Coordinates, RawSeries,
        error::{FetchError, LocateError},
        geocode::PlaceResolver,
        locate::GeoLocator,
        model::{DateKey, Metric},
        provider::WeatherFetcher,
    };

    #[derive(Debug)]
    pub struct FakeLocator(pub Option<Coordinates>);

    #[async_trait]
    impl GeoLocator for FakeLocator {
        async fn locate(&self) -> Result<Coordinates, LocateError> {
            self.0.ok_or(LocateError::PermissionOrTimeout("User denied Geolocation".into()))
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct FakeResolver {
        pub calls: Arc<Mutex<Vec<Coordinates>>>,
    }

    #[async_trait]
    impl PlaceResolver for FakeResolver {
        async fn resolve(&self, coords: Coordinates) -> String {
            self.calls.lock().unwrap().push(coords);
            "Lyon, France".to_string()
        }
    }

    #[derive(Debug, Clone, Copy)]
    pub enum Reply {
        Series,
        Empty,
        Unavailable,
    }

    /// Answers each fetch with the next scripted reply.
    #[derive(Debug, Clone)]
    pub struct FakeFetcher {
        pub replies: Arc<Mutex<Vec<Reply>>>,
        pub calls: Arc<Mutex<Vec<Coordinates>>>,
    }

    impl FakeFetcher {
        pub fn new(replies: &[Reply]) -> Self {
            let mut replies = replies.to_vec();
            replies.reverse();
            Self { replies: Arc::new(Mutex::new(replies)), calls: Arc::default() }
        }
    }

    pub fn sample_series() -> RawSeries {
        let key = |s: &str| s.parse::<DateKey>().unwrap();
        RawSeries::new()
            .with_readings(Metric::MaxTemperature, [(key("20240110"), 32.0), (key("20240109"), 20.0)])
            .with_readings(Metric::MinTemperature, [(key("20240110"), 22.0)])
    }

    #[async_trait]
    impl WeatherFetcher for FakeFetcher {
        async fn fetch(&self, coords: Coordinates) -> Result<RawSeries, FetchError> {
            self.calls.lock().unwrap().push(coords);
            match self.replies.lock().unwrap().pop().expect("unexpected fetch") {
                Reply::Series => Ok(sample_series()),
                Reply::Empty => Ok(RawSeries::new()),
                Reply::Unavailable => Err(FetchError::Schema("Invalid data from API.".into())),
            }
        }
    }
}
