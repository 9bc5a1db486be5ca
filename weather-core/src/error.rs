use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{Coordinate, Granularity};

/// Errors surfaced by weather queries.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "Invalid coordinate ({latitude}, {longitude}): latitude must be within [-90, 90] \
         and longitude within [-180, 180]"
    )]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown granularity '{0}'. Supported granularities: hourly, daily.")]
    UnknownGranularity(String),

    #[error("No station with {granularity} coverage on {date} found nearby")]
    NoStationFound {
        granularity: Granularity,
        date: NaiveDate,
    },

    #[error("No station publishing climate normals found near {0}")]
    NoNormalsFound(Coordinate),

    #[error("Weather provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Unexpected response from weather provider: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeatherError {
    /// Whether the caller supplied bad input, as opposed to a lookup or upstream failure.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCoordinate { .. } | Self::InvalidDate(_) | Self::UnknownGranularity(_)
        )
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
