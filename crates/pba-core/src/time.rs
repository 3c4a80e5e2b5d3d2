//! UTC calendar helpers (no chrono dependency).
//!
//! Uses Howard Hinnant's civil_from_days algorithm for Unix-to-date conversion
//! and a strict `YYYY-MM-DD` parser for dates of birth.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current UTC time as Unix seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current UTC time as Unix milliseconds.
pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Current UTC wall-clock time as `HH:MM:SS`.
pub fn now_clock() -> String {
    let (h, m, s) = clock_of(now_unix_secs());
    format!("{h:02}:{m:02}:{s:02}")
}

fn clock_of(secs: u64) -> (u64, u64, u64) {
    let time_of_day = secs % 86400;
    (time_of_day / 3600, (time_of_day % 3600) / 60, time_of_day % 60)
}

/// A proleptic Gregorian calendar date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarDate {
    pub year: i64,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    Format(String),
    OutOfRange(String),
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateError::Format(s) => write!(f, "expected YYYY-MM-DD, got '{s}'"),
            DateError::OutOfRange(s) => write!(f, "no such calendar date: '{s}'"),
        }
    }
}

impl std::error::Error for DateError {}

impl CalendarDate {
    /// Parse a strict `YYYY-MM-DD` date. Leading/trailing whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, DateError> {
        let trimmed = s.trim();
        let mut parts = trimmed.splitn(3, '-');
        let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(DateError::Format(s.to_string()));
        };
        if y.len() != 4 || m.len() != 2 || d.len() != 2 {
            return Err(DateError::Format(s.to_string()));
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !(all_digits(y) && all_digits(m) && all_digits(d)) {
            return Err(DateError::Format(s.to_string()));
        }

        // Digits-only and fixed width, so these parses cannot fail.
        let year: i64 = y.parse().map_err(|_| DateError::Format(s.to_string()))?;
        let month: u32 = m.parse().map_err(|_| DateError::Format(s.to_string()))?;
        let day: u32 = d.parse().map_err(|_| DateError::Format(s.to_string()))?;

        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return Err(DateError::OutOfRange(s.to_string()));
        }
        Ok(Self { year, month, day })
    }

    pub fn from_unix_secs(secs: u64) -> Self {
        let (year, month, day) = civil_from_days((secs / 86400) as i64);
        Self {
            year,
            month: month as u32,
            day: day as u32,
        }
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self::from_unix_secs(now_unix_secs())
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Howard Hinnant's civil_from_days: Unix epoch days → (year, month, day).
fn civil_from_days(days: i64) -> (i64, u64, u64) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_epoch() {
        assert_eq!(
            CalendarDate::from_unix_secs(0),
            CalendarDate { year: 1970, month: 1, day: 1 }
        );
        assert_eq!(clock_of(0), (0, 0, 0));
    }

    #[test]
    fn test_known_date() {
        // 2026-02-21T00:00:00Z = 1771632000
        assert_eq!(clock_of(1771632000 + 3723), (1, 2, 3));
        assert_eq!(
            CalendarDate::from_unix_secs(1771632000),
            CalendarDate { year: 2026, month: 2, day: 21 }
        );
    }

    #[test]
    fn test_parse_valid() {
        let d = CalendarDate::parse("1990-05-15").unwrap();
        assert_eq!((d.year, d.month, d.day), (1990, 5, 15));
        assert_eq!(d.to_string(), "1990-05-15");
        assert!(CalendarDate::parse(" 2000-02-29 ").is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for bad in ["", "1990/05/15", "90-05-15", "1990-5-15", "1990-05-1a", "1990-05"] {
            assert!(
                matches!(CalendarDate::parse(bad), Err(DateError::Format(_))),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        for bad in ["1990-13-01", "1990-00-10", "1990-04-31", "1900-02-29", "2001-02-29"] {
            assert!(
                matches!(CalendarDate::parse(bad), Err(DateError::OutOfRange(_))),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(1996));
        assert!(!is_leap_year(1900));
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
    }

    #[test]
    fn test_now_is_recent() {
        assert!(CalendarDate::today().year >= 2024);
        assert_eq!(now_clock().len(), 8);
    }
}
