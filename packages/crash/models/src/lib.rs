#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crash record types and the fixed calendar enumerations used across the
//! dashboard.
//!
//! The warehouse stores day-of-week and month as plain names
//! (`"Monday"`, `"January"`). Everything that needs their calendar order
//! (warehouse-side `ORDER BY`, pivots, seasonal buckets) goes through the
//! [`DayOfWeek`] and [`Month`] enumerations defined here instead of ad hoc
//! string comparisons.

use std::collections::BTreeSet;

use chrono::{Datelike as _, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Day of the week in Monday-first order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DayOfWeek {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl DayOfWeek {
    /// Returns the 1-based position in the week (Monday = 1).
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Returns the 0-based row index used by day x hour grids.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Returns all days, Monday first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
            Self::Sunday,
        ]
    }

    /// Returns the day a calendar date falls on.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// Calendar month, January first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Month {
    January = 1,
    February = 2,
    March = 3,
    April = 4,
    May = 5,
    June = 6,
    July = 7,
    August = 8,
    September = 9,
    October = 10,
    November = 11,
    December = 12,
}

impl Month {
    /// Returns the 1-based month number (January = 1).
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Returns the 0-based index into a 12-element series.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Creates a month from its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-12.
    pub const fn from_ordinal(value: u32) -> Result<Self, InvalidMonthError> {
        match value {
            1 => Ok(Self::January),
            2 => Ok(Self::February),
            3 => Ok(Self::March),
            4 => Ok(Self::April),
            5 => Ok(Self::May),
            6 => Ok(Self::June),
            7 => Ok(Self::July),
            8 => Ok(Self::August),
            9 => Ok(Self::September),
            10 => Ok(Self::October),
            11 => Ok(Self::November),
            12 => Ok(Self::December),
            _ => Err(InvalidMonthError { value }),
        }
    }

    /// Returns the month a calendar date falls in.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        // `NaiveDate::month()` is always 1-12.
        Self::from_ordinal(date.month()).unwrap_or(Self::January)
    }

    /// Returns the meteorological season this month belongs to.
    #[must_use]
    pub const fn season(self) -> Season {
        match self {
            Self::December | Self::January | Self::February => Season::Winter,
            Self::March | Self::April | Self::May => Season::Spring,
            Self::June | Self::July | Self::August => Season::Summer,
            Self::September | Self::October | Self::November => Season::Fall,
        }
    }

    /// Returns all months in calendar order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::January,
            Self::February,
            Self::March,
            Self::April,
            Self::May,
            Self::June,
            Self::July,
            Self::August,
            Self::September,
            Self::October,
            Self::November,
            Self::December,
        ]
    }
}

/// Error returned when a month number is outside 1-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMonthError {
    /// The rejected month number.
    pub value: u32,
}

impl std::fmt::Display for InvalidMonthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid month {}: expected 1-12", self.value)
    }
}

impl std::error::Error for InvalidMonthError {}

/// Seasonal bucket of three consecutive months.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Season {
    /// December, January, February
    Winter,
    /// March, April, May
    Spring,
    /// June, July, August
    Summer,
    /// September, October, November
    Fall,
}

impl Season {
    /// Returns the three months in this season, in the order they occur
    /// within the season.
    #[must_use]
    pub const fn months(self) -> [Month; 3] {
        match self {
            Self::Winter => [Month::December, Month::January, Month::February],
            Self::Spring => [Month::March, Month::April, Month::May],
            Self::Summer => [Month::June, Month::July, Month::August],
            Self::Fall => [Month::September, Month::October, Month::November],
        }
    }

    /// Returns the fixed display colour for this season.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Winter => "#A1C3D1",
            Self::Spring => "#B39EB5",
            Self::Summer => "#FFB6B9",
            Self::Fall => "#F9C784",
        }
    }

    /// Returns all seasons, Winter first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Winter, Self::Spring, Self::Summer, Self::Fall]
    }
}

/// The analyst's current filter choices.
///
/// An empty set for a dimension means that dimension is not filtered at
/// all, not that every row is excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Calendar years to include.
    pub selected_years: BTreeSet<i32>,
    /// `SEVERITY_CATEGORY` values to include.
    pub selected_severities: BTreeSet<String>,
}

impl FilterSelection {
    /// Creates a selection from any iterables of years and severities.
    #[must_use]
    pub fn new(
        years: impl IntoIterator<Item = i32>,
        severities: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            selected_years: years.into_iter().collect(),
            selected_severities: severities.into_iter().collect(),
        }
    }

    /// Resolves the filters an analyst asked for against the options the
    /// warehouse offers.
    ///
    /// `None` for a dimension means the analyst never touched it, so every
    /// available option is selected (the dashboard's initial state).
    /// `Some` is taken as is, and an empty list there means "no filter".
    #[must_use]
    pub fn resolve(
        requested_years: Option<Vec<i32>>,
        requested_severities: Option<Vec<String>>,
        available_years: &[i32],
        available_severities: &[String],
    ) -> Self {
        Self::new(
            requested_years.unwrap_or_else(|| available_years.to_vec()),
            requested_severities.unwrap_or_else(|| available_severities.to_vec()),
        )
    }

    /// Returns `true` when neither dimension is filtered.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.selected_years.is_empty() && self.selected_severities.is_empty()
    }
}

/// One row of the crash warehouse table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashRecord {
    /// Date the crash occurred (`DATE`).
    pub date: NaiveDate,
    /// Hour of day 0-23 (`HOUR`).
    pub hour: Option<u8>,
    /// Day of week (`DAYOFWEEKNAME`).
    pub day_of_week: DayOfWeek,
    /// Month (`MONTHNAME`).
    pub month: Month,
    /// Severity category (`SEVERITY_CATEGORY`).
    pub severity: Option<String>,
    /// First intersecting street (`INTASTREETNAME`).
    pub street_a: Option<String>,
    /// Second intersecting street (`INTBSTREETNAME`).
    pub street_b: Option<String>,
    /// Latitude (`LATITUDE`, WGS84).
    pub latitude: Option<f64>,
    /// Longitude (`LONGITUDE`, WGS84).
    pub longitude: Option<f64>,
}
