//! Human-readable rendering of query results.

use std::fmt::Write;

use weather_core::{NormalsResult, Station, StationReport, WeatherQuery, WeatherResult};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn stations(query: &WeatherQuery, stations: &[Station]) -> String {
    let mut out = format!(
        "Stations with {} coverage on {} near {}\n\n",
        query.granularity, query.date, query.coordinate
    );
    for station in stations {
        let _ = writeln!(out, "  {}", station_line(station));
    }
    out
}

pub fn weather(result: &WeatherResult) -> String {
    let mut out = format!(
        "Weather near {} on {} ({})\n",
        result.coordinate, result.date, result.granularity
    );
    for report in &result.reports {
        out.push('\n');
        out.push_str(&report_block(report));
    }
    out
}

pub fn normals(result: &NormalsResult) -> String {
    let mut out = format!(
        "Climate normals {}-{} from {}\n\n",
        result.period.start,
        result.period.end,
        station_line(&result.station)
    );

    if result.normals.is_empty() {
        out.push_str("  no normals published for this period\n");
        return out;
    }

    let _ = writeln!(out, "  {:<5}{:>8}{:>8}{:>8}{:>9}", "", "tavg", "tmin", "tmax", "prcp");
    for n in &result.normals {
        let _ = writeln!(
            out,
            "  {:<5}{:>8}{:>8}{:>8}{:>9}",
            month_name(n.month),
            value(n.tavg, 1),
            value(n.tmin, 1),
            value(n.tmax, 1),
            value(n.prcp, 1),
        );
    }
    out
}

fn station_line(station: &Station) -> String {
    let place = match (&station.region, &station.country) {
        (Some(region), Some(country)) => format!(" {country}/{region}"),
        (None, Some(country)) => format!(" {country}"),
        _ => String::new(),
    };
    let distance = station
        .distance_km
        .map(|d| format!(", {d:.1} km away"))
        .unwrap_or_default();

    format!("{} [{}]{}{}", station.name, station.id, place, distance)
}

fn report_block(report: &StationReport) -> String {
    let s = &report.summary;
    let mut out = format!("{}\n", station_line(&report.station));

    if s.records == 0 {
        out.push_str("  no observations for this date\n");
    } else {
        let _ = writeln!(
            out,
            "  {} records | temp mean {}°C (min {}, max {}) | precip {} mm | max wind {} km/h",
            s.records,
            value(s.temp_mean_c, 1),
            value(s.temp_min_c, 1),
            value(s.temp_max_c, 1),
            value(s.precipitation_mm, 1),
            value(s.max_wind_kmh, 1),
        );
    }

    if let Some(cmp) = &report.comparison {
        let anomaly = cmp
            .temp_anomaly_c
            .map(|a| format!("{a:+.1}°C"))
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(
            out,
            "  {} normal: tavg {}°C | temperature anomaly {}",
            month_name(cmp.month),
            value(cmp.normal_tavg_c, 1),
            anomaly,
        );
    }

    out
}

fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .copied()
        .unwrap_or("?")
}

fn value(v: Option<f64>, precision: usize) -> String {
    v.map(|v| format!("{v:.precision$}")).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use weather_core::model::{Inventory, MonthlyNormal, YearRange};
    use weather_core::{Coordinate, DaySummary, Granularity, NormalsComparison, Observations};

    fn ames() -> Station {
        Station {
            id: "72510".into(),
            name: "Ames Municipal Airport".into(),
            country: Some("US".into()),
            region: Some("IA".into()),
            location: Coordinate::new(41.99, -93.62).expect("valid coordinate"),
            elevation_m: Some(291.0),
            timezone: None,
            inventory: Inventory::default(),
            distance_km: Some(4.59),
        }
    }

    #[test]
    fn station_line_includes_place_and_distance() {
        assert_eq!(station_line(&ames()), "Ames Municipal Airport [72510] US/IA, 4.6 km away");
    }

    #[test]
    fn weather_report_shows_anomaly() {
        let result = WeatherResult {
            coordinate: Coordinate::new(42.0308, -93.6319).expect("valid coordinate"),
            date: NaiveDate::from_ymd_opt(2023, 7, 4).expect("valid date"),
            granularity: Granularity::Daily,
            reports: vec![StationReport {
                station: ames(),
                observations: Observations::Daily(Vec::new()),
                summary: DaySummary {
                    records: 1,
                    temp_mean_c: Some(24.4),
                    ..DaySummary::default()
                },
                normal: None,
                comparison: Some(NormalsComparison {
                    month: 7,
                    normal_tavg_c: Some(23.4),
                    temp_anomaly_c: Some(1.0),
                    normal_daily_prcp_mm: None,
                    prcp_anomaly_mm: None,
                }),
            }],
        };

        let text = weather(&result);
        assert!(text.starts_with("Weather near 42.0308, -93.6319 on 2023-07-04 (daily)"));
        assert!(text.contains("temp mean 24.4°C (min -, max -)"));
        assert!(text.contains("Jul normal: tavg 23.4°C | temperature anomaly +1.0°C"));
    }

    #[test]
    fn normals_table_and_empty_case() {
        let mut result = NormalsResult {
            station: ames(),
            period: YearRange::new(1991, 2020),
            normals: vec![MonthlyNormal {
                month: 1,
                tavg: Some(-6.4),
                tmin: None,
                tmax: None,
                prcp: Some(20.6),
                wspd: None,
                pres: None,
                tsun: None,
            }],
        };

        let text = normals(&result);
        assert!(text.contains("Climate normals 1991-2020"));
        assert!(text.contains("Jan"));
        assert!(text.contains("-6.4"));

        result.normals.clear();
        assert!(normals(&result).contains("no normals published"));
    }

    #[test]
    fn month_name_guards_range() {
        assert_eq!(month_name(1), "Jan");
        assert_eq!(month_name(12), "Dec");
        assert_eq!(month_name(0), "?");
        assert_eq!(month_name(13), "?");
    }
}
