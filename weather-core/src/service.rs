//! The weather query facade: coordinate + date + granularity in, station
//! reports out.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, instrument, warn};

use crate::{
    Config,
    analysis::{DaySummary, NormalsComparison},
    config::SearchConfig,
    error::{Result, WeatherError},
    model::{
        Coordinate, Granularity, MonthlyNormal, NormalsResult, Observations, Station,
        StationReport, WeatherQuery, WeatherResult, YearRange,
    },
    provider::{WeatherProvider, provider_from_config},
    selection::{rank_by_distance, select_stations},
};

/// Entry point for weather lookups. Owns its provider; construct one per
/// application and pass it where it is needed.
#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
    search: SearchConfig,
    normals_period: YearRange,
}

impl WeatherService {
    /// Fails with [`WeatherError::Config`] when `config` does not pass
    /// [`Config::validate`].
    pub fn new(provider: Box<dyn WeatherProvider>, config: &Config) -> Result<Self> {
        validate(config)?;

        Ok(Self {
            provider,
            search: config.search.clone(),
            normals_period: config.normals.period(),
        })
    }

    /// Build the service with the provider described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        validate(config)?;

        let provider = provider_from_config(config)?;
        Self::new(provider, config)
    }

    /// Validate raw input and run the query.
    ///
    /// `date` is `YYYY-MM-DD`, `granularity` is `"hourly"` or `"daily"`.
    pub async fn get_weather(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
        granularity: &str,
    ) -> Result<WeatherResult> {
        let query = WeatherQuery::parse(latitude, longitude, date, granularity)?;
        self.query(&query).await
    }

    #[instrument(
        skip(self, query),
        fields(
            coordinate = %query.coordinate,
            date = %query.date,
            granularity = %query.granularity
        )
    )]
    pub async fn query(&self, query: &WeatherQuery) -> Result<WeatherResult> {
        let stations = self.find_stations(query).await?;

        let mut reports = Vec::with_capacity(stations.len());
        for station in stations {
            reports.push(self.report(query, station).await?);
        }

        info!(stations = reports.len(), "weather query complete");

        Ok(WeatherResult {
            coordinate: query.coordinate,
            date: query.date,
            granularity: query.granularity,
            reports,
        })
    }

    /// Stations near the query point with coverage for its date and granularity.
    pub async fn find_stations(&self, query: &WeatherQuery) -> Result<Vec<Station>> {
        let candidates = self.candidates(query.coordinate).await?;
        let selected = select_stations(query, candidates, self.search.max_stations);

        if selected.is_empty() {
            return Err(WeatherError::NoStationFound {
                granularity: query.granularity,
                date: query.date,
            });
        }

        Ok(selected)
    }

    /// Normals from the nearest station that publishes them, optionally
    /// restricted to one calendar month.
    #[instrument(skip(self, coordinate), fields(coordinate = %coordinate))]
    pub async fn get_normals(
        &self,
        coordinate: Coordinate,
        month: Option<u32>,
    ) -> Result<NormalsResult> {
        if let Some(m) = month.filter(|m| !(1..=12).contains(m)) {
            return Err(WeatherError::InvalidDate(format!("month {m}")));
        }

        let mut candidates: Vec<Station> = self
            .candidates(coordinate)
            .await?
            .into_iter()
            .filter(Station::has_normals)
            .collect();
        rank_by_distance(&coordinate, &mut candidates);

        let station = candidates
            .into_iter()
            .next()
            .ok_or(WeatherError::NoNormalsFound(coordinate))?;

        let mut normals = self.provider.normals(&station.id, self.normals_period).await?;
        if let Some(m) = month {
            normals.retain(|n| n.month == m);
        }
        normals.sort_by_key(|n| n.month);

        Ok(NormalsResult {
            station,
            period: self.normals_period,
            normals,
        })
    }

    async fn candidates(&self, coordinate: Coordinate) -> Result<Vec<Station>> {
        let nearby = self
            .provider
            .nearby_stations(coordinate, self.search.station_limit, self.search.radius_km)
            .await?;

        debug!(count = nearby.len(), "nearby stations");

        let mut stations = Vec::with_capacity(nearby.len());
        for candidate in nearby {
            match self.provider.station(&candidate.id).await? {
                Some(station) => stations.push(station),
                None => warn!(id = %candidate.id, "station listed nearby has no metadata"),
            }
        }

        Ok(stations)
    }

    async fn report(&self, query: &WeatherQuery, station: Station) -> Result<StationReport> {
        let observations = match query.granularity {
            Granularity::Hourly => {
                let mut records = self.provider.hourly(&station.id, query.date, query.date).await?;
                records.retain(|r| r.time.date() == query.date);
                records.sort_by_key(|r| r.time);
                Observations::Hourly(records)
            }
            Granularity::Daily => {
                let mut records = self.provider.daily(&station.id, query.date, query.date).await?;
                records.retain(|r| r.date == query.date);
                Observations::Daily(records)
            }
        };

        let summary = DaySummary::from_observations(&observations);

        let normal = if station.has_normals() {
            self.month_normal(&station.id, query.date.month()).await?
        } else {
            None
        };

        let comparison = normal
            .as_ref()
            .map(|n| NormalsComparison::new(&summary, n, days_in_month(query.date)));

        debug!(station = %station.id, records = observations.len(), "station report");

        Ok(StationReport {
            station,
            observations,
            summary,
            normal,
            comparison,
        })
    }

    async fn month_normal(&self, station: &str, month: u32) -> Result<Option<MonthlyNormal>> {
        let normals = self.provider.normals(station, self.normals_period).await?;
        Ok(normals.into_iter().find(|n| n.month == month))
    }
}

fn validate(config: &Config) -> Result<()> {
    config
        .validate()
        .map_err(|e| WeatherError::Config(format!("{e:#}")))
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (y, m) = (date.year(), date.month());
    let next = if m == 12 {
        NaiveDate::from_ymd_opt(y + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(y, m + 1, 1)
    };

    match (NaiveDate::from_ymd_opt(y, m, 1), next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 30,
    }
}
