//! Aggregation of a day's observations and comparison against climate normals.

use serde::{Deserialize, Serialize};

use crate::model::{DailyObservation, HourlyObservation, MonthlyNormal, Observations};

/// Aggregate of one day's observations. Missing values are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub records: usize,
    pub temp_mean_c: Option<f64>,
    pub temp_min_c: Option<f64>,
    pub temp_max_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub max_wind_kmh: Option<f64>,
}

impl DaySummary {
    pub fn from_hourly(records: &[HourlyObservation]) -> Self {
        let temps: Vec<f64> = records.iter().filter_map(|r| r.temp).collect();

        Self {
            records: records.len(),
            temp_mean_c: mean(&temps),
            temp_min_c: fold_min(temps.iter().copied()),
            temp_max_c: fold_max(temps.iter().copied()),
            precipitation_mm: sum(records.iter().filter_map(|r| r.prcp)),
            max_wind_kmh: fold_max(records.iter().filter_map(|r| r.wspd)),
        }
    }

    pub fn from_daily(records: &[DailyObservation]) -> Self {
        let means: Vec<f64> = records.iter().filter_map(daily_mean).collect();

        Self {
            records: records.len(),
            temp_mean_c: mean(&means),
            temp_min_c: fold_min(records.iter().filter_map(|r| r.tmin)),
            temp_max_c: fold_max(records.iter().filter_map(|r| r.tmax)),
            precipitation_mm: sum(records.iter().filter_map(|r| r.prcp)),
            max_wind_kmh: fold_max(records.iter().filter_map(|r| r.wspd)),
        }
    }

    pub fn from_observations(observations: &Observations) -> Self {
        match observations {
            Observations::Hourly(records) => Self::from_hourly(records),
            Observations::Daily(records) => Self::from_daily(records),
        }
    }
}

/// How the observed day deviates from the month's normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalsComparison {
    pub month: u32,
    pub normal_tavg_c: Option<f64>,
    /// Observed mean minus normal mean, °C.
    pub temp_anomaly_c: Option<f64>,
    /// Monthly normal precipitation spread evenly over the month's days, mm.
    pub normal_daily_prcp_mm: Option<f64>,
    /// Observed precipitation minus `normal_daily_prcp_mm`.
    pub prcp_anomaly_mm: Option<f64>,
}

impl NormalsComparison {
    pub fn new(summary: &DaySummary, normal: &MonthlyNormal, days_in_month: u32) -> Self {
        let normal_daily_prcp_mm = normal.prcp.map(|p| p / f64::from(days_in_month.max(1)));

        Self {
            month: normal.month,
            normal_tavg_c: normal.tavg,
            temp_anomaly_c: diff(summary.temp_mean_c, normal.tavg),
            normal_daily_prcp_mm,
            prcp_anomaly_mm: diff(summary.precipitation_mm, normal_daily_prcp_mm),
        }
    }
}

fn daily_mean(record: &DailyObservation) -> Option<f64> {
    match (record.tavg, record.tmin, record.tmax) {
        (Some(avg), _, _) => Some(avg),
        (None, Some(min), Some(max)) => Some((min + max) / 2.0),
        _ => None,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sum(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

fn fold_min(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
}

fn fold_max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
}

fn diff(observed: Option<f64>, normal: Option<f64>) -> Option<f64> {
    Some(observed? - normal?)
}
