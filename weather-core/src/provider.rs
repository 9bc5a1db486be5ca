use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{
    Config,
    error::{Result, WeatherError},
    model::{
        Coordinate, DailyObservation, HourlyObservation, MonthlyNormal, NearbyStation, Station,
        YearRange,
    },
    provider::meteostat::MeteostatProvider,
};

pub mod meteostat;

/// Upstream source of station metadata, observations and normals.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Stations around `point`, nearest first as reported by the provider.
    async fn nearby_stations(
        &self,
        point: Coordinate,
        limit: usize,
        radius_km: u32,
    ) -> Result<Vec<NearbyStation>>;

    /// Full metadata for one station, `None` if the provider doesn't know it.
    async fn station(&self, id: &str) -> Result<Option<Station>>;

    async fn hourly(
        &self,
        station: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HourlyObservation>>;

    async fn daily(
        &self,
        station: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyObservation>>;

    async fn normals(&self, station: &str, period: YearRange) -> Result<Vec<MonthlyNormal>>;
}

/// Construct the Meteostat provider from config.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        WeatherError::Config(format!(
            "No Meteostat API key configured.\n\
             Hint: run `weather-mcp configure` or set {}.",
            crate::config::API_KEY_ENV
        ))
    })?;

    let provider = MeteostatProvider::with_base_url(
        api_key.to_owned(),
        config.base_url().to_owned(),
        config.timeout(),
    )?;

    Ok(Box::new(provider))
}
