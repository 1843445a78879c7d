use crate::models::{SeriesPoint, Statistics};

/// Assumed spacing between samples, in hours (one poll every two minutes).
/// Totals multiply every point by this instead of the measured gap.
pub const INTERVAL_HOURS: f64 = 2.0 / 60.0;

/// Reduces an aligned series to display statistics.
///
/// Current values come from `latest` when given, otherwise from the last
/// point of the series. An empty series yields all zeros.
pub fn aggregate(series: &[SeriesPoint], latest: Option<&SeriesPoint>) -> Statistics {
    let Some(last) = series.last() else {
        return Statistics::default();
    };
    let current = latest.unwrap_or(last);

    let (total_production, total_consumption) =
        series.iter().fold((0.0, 0.0), |(p, c), point| {
            (
                p + point.production * INTERVAL_HOURS,
                c + point.consumption * INTERVAL_HOURS,
            )
        });

    Statistics {
        current_production: current.production,
        current_consumption: current.consumption,
        total_production,
        total_consumption,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(secs: i64, production: f64, consumption: f64) -> SeriesPoint {
        SeriesPoint {
            timestamp: Utc.timestamp_opt(1_717_243_200 + secs, 0).unwrap(),
            production,
            consumption,
            unit: "W".into(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_series_is_all_zero() {
        assert_eq!(aggregate(&[], None), Statistics::default());
        let latest = point(0, 400.0, 300.0);
        assert_eq!(aggregate(&[], Some(&latest)), Statistics::default());
    }

    #[test]
    fn test_single_point_totals() {
        let stats = aggregate(&[point(0, 5.0, 3.0)], None);

        assert!(approx(stats.total_production, 5.0 * 2.0 / 60.0));
        assert!((stats.total_production - 0.1667).abs() < 1e-4);
        assert!(approx(stats.total_consumption, 0.1));
        assert_eq!(stats.current_production, 5.0);
        assert_eq!(stats.current_consumption, 3.0);
    }

    #[test]
    fn test_totals_ignore_actual_gaps() {
        let dense = [point(0, 600.0, 0.0), point(120, 600.0, 0.0)];
        let sparse = [point(0, 600.0, 0.0), point(7200, 600.0, 0.0)];

        assert_eq!(
            aggregate(&dense, None).total_production,
            aggregate(&sparse, None).total_production
        );
        assert!(approx(aggregate(&dense, None).total_production, 40.0));
    }

    #[test]
    fn test_latest_overrides_last_point() {
        let series = [point(0, 100.0, 50.0), point(120, 200.0, 60.0)];
        let latest = point(240, 321.0, 12.0);

        let stats = aggregate(&series, Some(&latest));

        assert_eq!(stats.current_production, 321.0);
        assert_eq!(stats.current_consumption, 12.0);

        let stats = aggregate(&series, None);
        assert_eq!(stats.current_production, 200.0);
        assert_eq!(stats.current_consumption, 60.0);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let series = [point(0, 1.5, 2.5), point(60, 3.5, 4.5)];
        assert_eq!(aggregate(&series, None), aggregate(&series, None));
    }
}
