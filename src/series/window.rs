use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Relative query windows offered by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    OneWeek,
    #[serde(rename = "30d")]
    OneMonth,
}

impl TimeRange {
    pub const ALL: [TimeRange; 8] = [
        TimeRange::OneHour,
        TimeRange::TwoHours,
        TimeRange::FourHours,
        TimeRange::SixHours,
        TimeRange::TwelveHours,
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            TimeRange::OneHour => "1h",
            TimeRange::TwoHours => "2h",
            TimeRange::FourHours => "4h",
            TimeRange::SixHours => "6h",
            TimeRange::TwelveHours => "12h",
            TimeRange::OneDay => "24h",
            TimeRange::OneWeek => "7d",
            TimeRange::OneMonth => "30d",
        }
    }

    /// Months are always 30 days.
    pub fn duration_ms(&self) -> i64 {
        match self {
            TimeRange::OneHour => HOUR_MS,
            TimeRange::TwoHours => 2 * HOUR_MS,
            TimeRange::FourHours => 4 * HOUR_MS,
            TimeRange::SixHours => 6 * HOUR_MS,
            TimeRange::TwelveHours => 12 * HOUR_MS,
            TimeRange::OneDay => DAY_MS,
            TimeRange::OneWeek => 7 * DAY_MS,
            TimeRange::OneMonth => 30 * DAY_MS,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.duration_ms())
    }

    /// The window ending at `now`.
    pub fn window(&self, now: DateTime<Utc>) -> QueryWindow {
        QueryWindow {
            start: now - self.duration(),
            end: now,
        }
    }

    /// Unknown tokens resolve to one hour.
    pub fn parse_lenient(token: &str) -> Self {
        token.parse().unwrap_or_else(|_| {
            warn!(token, "unknown time range, falling back to 1h");
            TimeRange::OneHour
        })
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for TimeRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.token() == s)
            .ok_or_else(|| AppError::Configuration(format!("unknown time range: {}", s)))
    }
}

/// Absolute bounds of a query, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub fn resolve_window(token: &str, now: DateTime<Utc>) -> QueryWindow {
    TimeRange::parse_lenient(token).window(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap()
    }

    #[test]
    fn test_week_window() {
        let window = resolve_window("7d", now());

        assert_eq!(window.end, now());
        assert_eq!(
            (window.end - window.start).num_milliseconds(),
            604_800_000
        );
    }

    #[test]
    fn test_duration_table() {
        let expected = [
            ("1h", 3_600_000),
            ("2h", 7_200_000),
            ("4h", 14_400_000),
            ("6h", 21_600_000),
            ("12h", 43_200_000),
            ("24h", 86_400_000),
            ("7d", 604_800_000),
            ("30d", 2_592_000_000),
        ];
        for (token, ms) in expected {
            let window = resolve_window(token, now());
            assert_eq!(window.start, now() - Duration::milliseconds(ms), "{token}");
        }
    }

    #[test]
    fn test_unknown_token_falls_back_to_one_hour() {
        for token in ["", "3h", "1y", "7D"] {
            let window = resolve_window(token, now());
            assert_eq!(window.start, now() - Duration::hours(1), "{token:?}");
        }
    }

    #[test]
    fn test_strict_parse_rejects_unknown_token() {
        assert!(matches!(
            "90m".parse::<TimeRange>(),
            Err(AppError::Configuration(_))
        ));
        assert_eq!("30d".parse::<TimeRange>().unwrap(), TimeRange::OneMonth);
    }

    #[test]
    fn test_serde_uses_tokens() {
        let json = serde_json::to_string(&TimeRange::TwelveHours).unwrap();
        assert_eq!(json, "\"12h\"");
        let parsed: TimeRange = serde_json::from_str("\"24h\"").unwrap();
        assert_eq!(parsed, TimeRange::OneDay);
    }
}
