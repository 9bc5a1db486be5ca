//! Ranking of candidate stations for a query.
//!
//! A station qualifies when its inventory covers the query date at the query
//! granularity. Qualifying stations are ordered nearest first, ties broken by
//! station id, and the list is cut to `max_stations`.

use std::collections::HashSet;

use tracing::debug;

use crate::model::{Coordinate, Station, WeatherQuery};

pub fn select_stations(
    query: &WeatherQuery,
    candidates: Vec<Station>,
    max_stations: usize,
) -> Vec<Station> {
    let total = candidates.len();
    let mut seen = HashSet::new();

    let mut qualifying: Vec<Station> = candidates
        .into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .filter(|s| s.supports(query.granularity, query.date))
        .collect();

    rank_by_distance(&query.coordinate, &mut qualifying);
    qualifying.truncate(max_stations);

    debug!(
        candidates = total,
        selected = qualifying.len(),
        granularity = %query.granularity,
        date = %query.date,
        "station selection"
    );

    qualifying
}

/// Fill in each station's distance from `point` and sort nearest first,
/// ties broken by id.
pub fn rank_by_distance(point: &Coordinate, stations: &mut [Station]) {
    for station in stations.iter_mut() {
        station.distance_km = Some(point.distance_km(&station.location));
    }

    stations.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(f64::INFINITY);
        let db = b.distance_km.unwrap_or(f64::INFINITY);
        da.total_cmp(&db).then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateRange, Granularity, Inventory};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn station(id: &str, lat: f64, lon: f64, hourly: bool, daily: bool) -> Station {
        let range = DateRange::new(date(1990, 1, 1), date(2024, 12, 31));
        Station {
            id: id.to_string(),
            name: format!("Station {id}"),
            country: Some("US".into()),
            region: Some("IA".into()),
            location: Coordinate::new(lat, lon).expect("valid coordinate"),
            elevation_m: None,
            timezone: None,
            inventory: Inventory {
                hourly: hourly.then_some(range),
                daily: daily.then_some(range),
                normals: None,
            },
            distance_km: None,
        }
    }

    fn iowa_query(granularity: Granularity) -> WeatherQuery {
        WeatherQuery::new(
            Coordinate::new(42.0308, -93.6319).expect("valid coordinate"),
            date(2023, 7, 4),
            granularity,
        )
    }

    #[test]
    fn nearest_first() {
        let candidates = vec![
            station("far", 41.53, -93.65, true, true),
            station("near", 41.99, -93.62, true, true),
            station("mid", 42.55, -94.19, true, true),
        ];

        let selected = select_stations(&iowa_query(Granularity::Hourly), candidates, 3);
        let ids: Vec<_> = selected.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["near", "far", "mid"]);
        assert!(selected.iter().all(|s| s.distance_km.is_some()));
    }

    #[test]
    fn excludes_stations_without_coverage() {
        let candidates = vec![
            station("daily-only", 41.99, -93.62, false, true),
            station("hourly", 42.10, -93.60, true, false),
        ];

        let selected = select_stations(&iowa_query(Granularity::Hourly), candidates.clone(), 5);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "hourly");

        let selected = select_stations(&iowa_query(Granularity::Daily), candidates, 5);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "daily-only");
    }

    #[test]
    fn ties_break_on_id() {
        let candidates = vec![
            station("b", 41.99, -93.62, true, true),
            station("a", 41.99, -93.62, true, true),
        ];

        let selected = select_stations(&iowa_query(Granularity::Daily), candidates, 2);
        assert_eq!(selected[0].id, "a");
        assert_eq!(selected[1].id, "b");
    }

    #[test]
    fn honours_limit_and_drops_duplicates() {
        let candidates = vec![
            station("a", 41.99, -93.62, true, true),
            station("a", 41.99, -93.62, true, true),
            station("b", 42.20, -93.62, true, true),
            station("c", 42.40, -93.62, true, true),
        ];

        let selected = select_stations(&iowa_query(Granularity::Daily), candidates, 2);
        let ids: Vec<_> = selected.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn nothing_qualifies() {
        let candidates = vec![station("x", 41.99, -93.62, false, false)];
        assert!(select_stations(&iowa_query(Granularity::Daily), candidates, 3).is_empty());
    }
}
