use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError},
    model::{
        Coordinate, DailyObservation, DateRange, HourlyObservation, Inventory, MonthlyNormal,
        NearbyStation, Station, YearRange,
    },
};

use super::WeatherProvider;

const RAPIDAPI_HOST: &str = "meteostat.p.rapidapi.com";
const HOURLY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the Meteostat JSON API, served through RapidAPI.
#[derive(Debug, Clone)]
pub struct MeteostatProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl MeteostatProvider {
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    #[instrument(skip(self, query), level = "debug")]
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let res = self
            .http
            .get(&url)
            .header("x-rapidapi-key", self.api_key.as_str())
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "timed out" } else { "failed" };
                WeatherError::UpstreamUnavailable(format!(
                    "Request to Meteostat ({endpoint}) {reason}: {e}"
                ))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::UpstreamUnavailable(format!(
                "Failed to read Meteostat {endpoint} response body: {e}"
            ))
        })?;

        debug!(%status, bytes = body.len(), "meteostat response");

        if !status.is_success() {
            return Err(WeatherError::UpstreamUnavailable(format!(
                "Meteostat {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::MalformedResponse(format!(
                "Failed to parse Meteostat {endpoint} JSON: {e}"
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct MsEnvelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MsName {
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MsNearby {
    id: String,
    name: Option<MsName>,
    /// Metres.
    distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MsLocation {
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MsDateSpan {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct MsYearSpan {
    start: Option<i32>,
    end: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct MsInventory {
    hourly: Option<MsDateSpan>,
    daily: Option<MsDateSpan>,
    normals: Option<MsYearSpan>,
}

#[derive(Debug, Deserialize)]
struct MsStation {
    id: String,
    name: Option<MsName>,
    country: Option<String>,
    region: Option<String>,
    location: MsLocation,
    timezone: Option<String>,
    #[serde(default)]
    inventory: MsInventory,
}

#[derive(Debug, Deserialize)]
struct MsHourly {
    time: String,
    temp: Option<f64>,
    dwpt: Option<f64>,
    rhum: Option<f64>,
    prcp: Option<f64>,
    snow: Option<f64>,
    wdir: Option<f64>,
    wspd: Option<f64>,
    wpgt: Option<f64>,
    pres: Option<f64>,
    tsun: Option<f64>,
    coco: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MsDaily {
    date: NaiveDate,
    tavg: Option<f64>,
    tmin: Option<f64>,
    tmax: Option<f64>,
    prcp: Option<f64>,
    snow: Option<f64>,
    wdir: Option<f64>,
    wspd: Option<f64>,
    wpgt: Option<f64>,
    pres: Option<f64>,
    tsun: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MsNormal {
    month: u32,
    tavg: Option<f64>,
    tmin: Option<f64>,
    tmax: Option<f64>,
    prcp: Option<f64>,
    wspd: Option<f64>,
    pres: Option<f64>,
    tsun: Option<f64>,
}

impl MsStation {
    fn into_station(self) -> Result<Station> {
        let location = Coordinate::new(self.location.latitude, self.location.longitude)
            .map_err(|_| {
                WeatherError::MalformedResponse(format!(
                    "Station {} has an invalid location ({}, {})",
                    self.id, self.location.latitude, self.location.longitude
                ))
            })?;

        let normals = self.inventory.normals.and_then(|span| match (span.start, span.end) {
            (Some(start), Some(end)) => Some(YearRange { start, end }),
            _ => None,
        });

        Ok(Station {
            name: english_name(self.name).unwrap_or_else(|| self.id.clone()),
            id: self.id,
            country: self.country,
            region: self.region,
            location,
            elevation_m: self.location.elevation,
            timezone: self.timezone,
            inventory: Inventory {
                hourly: self.inventory.hourly.map(MsDateSpan::into_range),
                daily: self.inventory.daily.map(MsDateSpan::into_range),
                normals,
            },
            distance_km: None,
        })
    }
}

impl MsDateSpan {
    fn into_range(self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }
}

impl MsHourly {
    fn into_observation(self) -> Result<HourlyObservation> {
        let time = NaiveDateTime::parse_from_str(&self.time, HOURLY_TIME_FORMAT).map_err(|e| {
            let msg = format!("Invalid hourly timestamp '{}': {e}", self.time);
            WeatherError::MalformedResponse(msg)
        })?;

        Ok(HourlyObservation {
            time,
            temp: self.temp,
            dwpt: self.dwpt,
            rhum: self.rhum,
            prcp: self.prcp,
            snow: self.snow,
            wdir: self.wdir,
            wspd: self.wspd,
            wpgt: self.wpgt,
            pres: self.pres,
            tsun: self.tsun,
            coco: self.coco.map(|c| c.round().clamp(0.0, 255.0) as u8),
        })
    }
}

impl From<MsDaily> for DailyObservation {
    fn from(d: MsDaily) -> Self {
        Self {
            date: d.date,
            tavg: d.tavg,
            tmin: d.tmin,
            tmax: d.tmax,
            prcp: d.prcp,
            snow: d.snow,
            wdir: d.wdir,
            wspd: d.wspd,
            wpgt: d.wpgt,
            pres: d.pres,
            tsun: d.tsun,
        }
    }
}

impl From<MsNormal> for MonthlyNormal {
    fn from(n: MsNormal) -> Self {
        Self {
            month: n.month,
            tavg: n.tavg,
            tmin: n.tmin,
            tmax: n.tmax,
            prcp: n.prcp,
            wspd: n.wspd,
            pres: n.pres,
            tsun: n.tsun,
        }
    }
}

#[async_trait]
impl WeatherProvider for MeteostatProvider {
    async fn nearby_stations(
        &self,
        point: Coordinate,
        limit: usize,
        radius_km: u32,
    ) -> Result<Vec<NearbyStation>> {
        let envelope: MsEnvelope<Vec<MsNearby>> = self
            .get_json(
                "/stations/nearby",
                &[
                    ("lat", point.latitude().to_string()),
                    ("lon", point.longitude().to_string()),
                    ("limit", limit.to_string()),
                    ("radius", radius_km.to_string()),
                ],
            )
            .await?;

        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|s| NearbyStation {
                id: s.id,
                name: english_name(s.name),
                distance_km: s.distance.map(|m| m / 1000.0),
            })
            .collect())
    }

    async fn station(&self, id: &str) -> Result<Option<Station>> {
        let envelope: MsEnvelope<MsStation> =
            self.get_json("/stations/meta", &[("id", id.to_string())]).await?;

        envelope.data.map(MsStation::into_station).transpose()
    }

    async fn hourly(
        &self,
        station: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HourlyObservation>> {
        let envelope: MsEnvelope<Vec<MsHourly>> =
            self.get_json("/stations/hourly", &period_query(station, start, end)).await?;

        envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(MsHourly::into_observation)
            .collect()
    }

    async fn daily(
        &self,
        station: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyObservation>> {
        let envelope: MsEnvelope<Vec<MsDaily>> =
            self.get_json("/stations/daily", &period_query(station, start, end)).await?;

        Ok(envelope.data.unwrap_or_default().into_iter().map(Into::into).collect())
    }

    async fn normals(&self, station: &str, period: YearRange) -> Result<Vec<MonthlyNormal>> {
        let envelope: MsEnvelope<Vec<MsNormal>> = self
            .get_json(
                "/stations/normals",
                &[
                    ("station", station.to_string()),
                    ("start", period.start.to_string()),
                    ("end", period.end.to_string()),
                ],
            )
            .await?;

        Ok(envelope.data.unwrap_or_default().into_iter().map(Into::into).collect())
    }
}

fn period_query(station: &str, start: NaiveDate, end: NaiveDate) -> [(&'static str, String); 3] {
    [
        ("station", station.to_string()),
        ("start", start.format("%Y-%m-%d").to_string()),
        ("end", end.format("%Y-%m-%d").to_string()),
    ]
}

fn english_name(name: Option<MsName>) -> Option<String> {
    name.and_then(|n| n.en).filter(|n| !n.is_empty())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
