//! Error types for each pipeline stage.
//!
//! Reverse geocoding has no error type: the resolver absorbs its own failures.

use thiserror::Error;

/// A date key that is not a valid `YYYYMMDD` calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date key '{0}', expected YYYYMMDD")]
pub struct InvalidDateKey(pub String);

#[derive(Debug, Error)]
pub enum LocateError {
    /// No position provider is available.
    #[error("Geolocation is not supported.")]
    Unsupported,

    /// The provider rejected the request: permission denied, timeout or
    /// position unavailable.
    #[error("Could not determine position: {0}")]
    PermissionOrTimeout(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Weather request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Weather request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The payload decoded but does not have the expected shape.
    #[error("Invalid data from weather API: {0}")]
    Schema(String),
}

impl FetchError {
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("No historical data available for this location.")]
    EmptySeries,
}

/// Terminal outcomes of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The fetch for the fallback location failed as well.
    #[error("Weather fetch for the default location failed")]
    DefaultLocationUnavailable(#[source] FetchError),

    #[error("No historical data available for this location")]
    NoData,
}

impl PipelineError {
    /// Fixed, non-technical message for the error banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::DefaultLocationUnavailable(_) => {
                "Could not fetch data for the default location. Please try again later."
            }
            Self::NoData => "No historical data available for this location.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_fixed() {
        let err = PipelineError::DefaultLocationUnavailable(FetchError::Schema("x".into()));
        assert_eq!(
            err.user_message(),
            "Could not fetch data for the default location. Please try again later."
        );
        assert!(PipelineError::NoData.user_message().contains("No historical data"));
    }

    #[test]
    fn schema_errors_are_distinguishable() {
        assert!(FetchError::Schema("missing properties".into()).is_schema());
    }
}
