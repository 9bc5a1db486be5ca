use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::analysis::{DaySummary, NormalsComparison};
use crate::error::{Result, WeatherError};

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A validated geographic point, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = WeatherError;

    fn try_from(raw: RawCoordinate) -> std::result::Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(WeatherError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Temporal resolution of requested observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
        }
    }

    pub const fn all() -> &'static [Granularity] {
        &[Granularity::Hourly, Granularity::Daily]
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Granularity {
    type Error = WeatherError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "hourly" => Ok(Granularity::Hourly),
            "daily" => Ok(Granularity::Daily),
            _ => Err(WeatherError::UnknownGranularity(value.to_string())),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = WeatherError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Granularity::try_from(s)
    }
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| WeatherError::InvalidDate(value.to_string()))
}

/// Inclusive coverage period. Upstream may leave either bound unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        }
    }
}

/// Span of years a normals table averages over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }
}

/// Data coverage a station reports, per granularity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub hourly: Option<DateRange>,
    pub daily: Option<DateRange>,
    pub normals: Option<YearRange>,
}

impl Inventory {
    pub fn range(&self, granularity: Granularity) -> Option<&DateRange> {
        match granularity {
            Granularity::Hourly => self.hourly.as_ref(),
            Granularity::Daily => self.daily.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub location: Coordinate,
    pub elevation_m: Option<f64>,
    pub timezone: Option<String>,
    pub inventory: Inventory,
    /// Distance from the query point, set once the station is matched to a query.
    pub distance_km: Option<f64>,
}

impl Station {
    /// Whether the station reports `granularity` data covering `date`.
    pub fn supports(&self, granularity: Granularity, date: NaiveDate) -> bool {
        self.inventory.range(granularity).is_some_and(|range| range.covers(date))
    }

    pub fn has_normals(&self) -> bool {
        self.inventory.normals.is_some()
    }
}

/// Candidate returned by a proximity search, before metadata is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStation {
    pub id: String,
    pub name: Option<String>,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherQuery {
    pub coordinate: Coordinate,
    pub date: NaiveDate,
    pub granularity: Granularity,
}

impl WeatherQuery {
    pub fn new(coordinate: Coordinate, date: NaiveDate, granularity: Granularity) -> Self {
        Self {
            coordinate,
            date,
            granularity,
        }
    }

    /// Validate raw caller input into a query.
    pub fn parse(latitude: f64, longitude: f64, date: &str, granularity: &str) -> Result<Self> {
        let coordinate = Coordinate::new(latitude, longitude)?;
        let date = parse_date(date)?;
        let granularity = Granularity::try_from(granularity)?;
        Ok(Self::new(coordinate, date, granularity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyObservation {
    pub time: NaiveDateTime,
    /// Air temperature, °C.
    pub temp: Option<f64>,
    /// Dew point, °C.
    pub dwpt: Option<f64>,
    /// Relative humidity, %.
    pub rhum: Option<f64>,
    /// Precipitation, mm.
    pub prcp: Option<f64>,
    /// Snow depth, mm.
    pub snow: Option<f64>,
    /// Wind direction, degrees.
    pub wdir: Option<f64>,
    /// Average wind speed, km/h.
    pub wspd: Option<f64>,
    /// Peak gust, km/h.
    pub wpgt: Option<f64>,
    /// Sea-level pressure, hPa.
    pub pres: Option<f64>,
    /// Sunshine, minutes.
    pub tsun: Option<f64>,
    /// Meteostat weather condition code.
    pub coco: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub tavg: Option<f64>,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub prcp: Option<f64>,
    pub snow: Option<f64>,
    pub wdir: Option<f64>,
    pub wspd: Option<f64>,
    pub wpgt: Option<f64>,
    pub pres: Option<f64>,
    pub tsun: Option<f64>,
}

/// Long-term average for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyNormal {
    pub month: u32,
    pub tavg: Option<f64>,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub prcp: Option<f64>,
    pub wspd: Option<f64>,
    pub pres: Option<f64>,
    pub tsun: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "granularity", content = "records", rename_all = "lowercase")]
pub enum Observations {
    Hourly(Vec<HourlyObservation>),
    Daily(Vec<DailyObservation>),
}

impl Observations {
    pub fn len(&self) -> usize {
        match self {
            Observations::Hourly(records) => records.len(),
            Observations::Daily(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReport {
    pub station: Station,
    pub observations: Observations,
    pub summary: DaySummary,
    pub normal: Option<MonthlyNormal>,
    pub comparison: Option<NormalsComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub coordinate: Coordinate,
    pub date: NaiveDate,
    pub granularity: Granularity,
    pub reports: Vec<StationReport>,
}

impl WeatherResult {
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.reports.iter().map(|r| &r.station)
    }
}

/// Normals for the nearest station that publishes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalsResult {
    pub station: Station,
    pub period: YearRange,
    pub normals: Vec<MonthlyNormal>,
}
