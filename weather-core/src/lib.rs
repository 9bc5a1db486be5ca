//! Core library for `weather-mcp`.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over the upstream weather provider (Meteostat)
//! - Station selection for a coordinate, date and granularity
//! - The `get_weather` facade and the analysis it returns
//!
//! It is used by the `weather-mcp` binary, but can also be embedded in other
//! tools or servers.

pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod selection;
pub mod service;

pub use analysis::{DaySummary, NormalsComparison};
pub use config::Config;
pub use error::WeatherError;
pub use model::{
    Coordinate, Granularity, NormalsResult, Observations, Station, StationReport, WeatherQuery,
    WeatherResult,
};
pub use provider::{WeatherProvider, meteostat::MeteostatProvider};
pub use service::WeatherService;
