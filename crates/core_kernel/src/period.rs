//! Report windows and timezone handling
//!
//! A trial balance is always computed for a window: everything dated on or
//! after `from_date` and on or before `as_of_date` is period activity,
//! everything before `from_date` is opening balance, and anything after
//! `as_of_date` is ignored.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid report window: from {from} must not be after as-of {as_of}")]
    InvalidWindow {
        from: String,
        as_of: String,
    },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Timezone wrapper used to resolve "today" for a tenant
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timezone::from_name(&s).map_err(serde::de::Error::custom)
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parses an IANA timezone name such as "Asia/Riyadh"
    pub fn from_name(name: &str) -> Result<Self, TemporalError> {
        Tz::from_str(name)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(name.to_string()))
    }

    /// Returns the current calendar date in this timezone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Where a dated line falls relative to a report window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    /// Dated before `from_date`: contributes to opening balances
    Opening,
    /// Dated within `[from_date, as_of_date]`: contributes to period movement
    Period,
    /// Dated after `as_of_date`: excluded from the report
    Future,
}

/// The `(from_date, as_of_date)` window of a trial balance
///
/// # Invariants
///
/// - `from_date <= as_of_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct ReportWindow {
    from_date: NaiveDate,
    as_of_date: NaiveDate,
}

/// Unchecked wire form of a window
#[derive(Deserialize)]
struct WindowBounds {
    from_date: NaiveDate,
    as_of_date: NaiveDate,
}

impl TryFrom<WindowBounds> for ReportWindow {
    type Error = TemporalError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        ReportWindow::new(bounds.from_date, bounds.as_of_date)
    }
}

impl ReportWindow {
    /// Creates a validated window
    ///
    /// # Errors
    ///
    /// Returns `TemporalError::InvalidWindow` if `from_date` is after `as_of_date`
    pub fn new(from_date: NaiveDate, as_of_date: NaiveDate) -> Result<Self, TemporalError> {
        if from_date > as_of_date {
            return Err(TemporalError::InvalidWindow {
                from: from_date.to_string(),
                as_of: as_of_date.to_string(),
            });
        }
        Ok(Self { from_date, as_of_date })
    }

    /// Creates a window from January 1st of the as-of year up to `as_of_date`
    pub fn year_to_date(as_of_date: NaiveDate) -> Self {
        let from_date = NaiveDate::from_ymd_opt(as_of_date.year(), 1, 1).unwrap_or(as_of_date);
        Self { from_date, as_of_date }
    }

    /// Builds a window from optional bounds, defaulting the as-of date to
    /// today in `timezone` and the start to January 1st of the as-of year
    pub fn resolve(
        from_date: Option<NaiveDate>,
        as_of_date: Option<NaiveDate>,
        timezone: &Timezone,
    ) -> Result<Self, TemporalError> {
        let as_of_date = as_of_date.unwrap_or_else(|| timezone.today());
        match from_date {
            Some(from_date) => Self::new(from_date, as_of_date),
            None => Ok(Self::year_to_date(as_of_date)),
        }
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from_date
    }

    pub fn as_of_date(&self) -> NaiveDate {
        self.as_of_date
    }

    /// Classifies a date against the window. The period side is inclusive
    /// on both ends.
    pub fn position(&self, date: NaiveDate) -> WindowPosition {
        if date > self.as_of_date {
            WindowPosition::Future
        } else if date >= self.from_date {
            WindowPosition::Period
        } else {
            WindowPosition::Opening
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        let result = ReportWindow::new(date(2024, 2, 1), date(2024, 1, 31));
        assert!(matches!(result, Err(TemporalError::InvalidWindow { .. })));
    }

    #[test]
    fn test_single_day_window_is_valid() {
        let window = ReportWindow::new(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(window.position(date(2024, 3, 1)), WindowPosition::Period);
    }

    #[test]
    fn test_position_boundaries() {
        let window = ReportWindow::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();

        assert_eq!(window.position(date(2023, 12, 31)), WindowPosition::Opening);
        assert_eq!(window.position(date(2024, 1, 1)), WindowPosition::Period);
        assert_eq!(window.position(date(2024, 12, 31)), WindowPosition::Period);
        assert_eq!(window.position(date(2025, 1, 1)), WindowPosition::Future);
    }

    #[test]
    fn test_year_to_date() {
        let window = ReportWindow::year_to_date(date(2024, 8, 15));
        assert_eq!(window.from_date(), date(2024, 1, 1));
        assert_eq!(window.as_of_date(), date(2024, 8, 15));
    }

    #[test]
    fn test_timezone_from_name() {
        assert!(Timezone::from_name("Asia/Riyadh").is_ok());
        assert_eq!(
            Timezone::from_name("Mars/Olympus"),
            Err(TemporalError::UnknownTimezone("Mars/Olympus".to_string()))
        );
    }
}
