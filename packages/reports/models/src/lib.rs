#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report outputs for the crash dashboard.
//!
//! Each report reshapes a warehouse table into one of the typed values in
//! this crate. A report that could not be produced is carried as
//! [`ReportSection::Failed`] with the message the dashboard shows inline,
//! so one failed section never affects the others.

use crash_dashboard_crash_models::{DayOfWeek, FilterSelection, Month, Season};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of hours in the hourly and heatmap reports.
pub const HOURS_PER_DAY: usize = 24;

/// Outcome of one dashboard section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReportSection<T> {
    /// The report was produced.
    Ready {
        /// The report data.
        data: T,
    },
    /// The report could not be produced; `message` is shown in its place.
    Failed {
        /// Inline error message.
        message: String,
    },
}

impl<T> ReportSection<T> {
    /// Wraps ready data.
    pub const fn ready(data: T) -> Self {
        Self::Ready { data }
    }

    /// Creates a failed section.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// The data, if the report was produced.
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Ready { data } => Some(data),
            Self::Failed { .. } => None,
        }
    }

    /// The inline error message, if the report failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Ready { .. } => None,
            Self::Failed { message } => Some(message),
        }
    }

    /// Borrows the data.
    pub fn as_ref(&self) -> ReportSection<&T> {
        match self {
            Self::Ready { data } => ReportSection::Ready { data },
            Self::Failed { message } => ReportSection::Failed {
                message: message.clone(),
            },
        }
    }

    /// Transforms ready data, keeping a failure as is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReportSection<U> {
        match self {
            Self::Ready { data } => ReportSection::Ready { data: f(data) },
            Self::Failed { message } => ReportSection::Failed { message },
        }
    }
}

/// How the hourly distribution is drawn. Does not affect the data.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HourlyChartStyle {
    /// Line with markers.
    #[default]
    Line,
    /// Bars coloured by count.
    Bar,
    /// Filled area.
    Area,
}

impl HourlyChartStyle {
    /// Human-readable label for selectors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Line => "Line Chart",
            Self::Bar => "Bar Chart",
            Self::Area => "Area Chart",
        }
    }

    /// Returns every style, default first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Line, Self::Bar, Self::Area]
    }
}

/// Crash count at one intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionCount {
    /// First street (`INTASTREETNAME`).
    pub street_a: String,
    /// Second street (`INTBSTREETNAME`).
    pub street_b: String,
    /// Number of crashes.
    pub crash_count: u64,
    /// Mean latitude of the crashes, if known.
    pub latitude: Option<f64>,
    /// Mean longitude of the crashes, if known.
    pub longitude: Option<f64>,
}

impl IntersectionCount {
    /// Display label, `"A & B"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} & {}", self.street_a, self.street_b)
    }

    /// Mean coordinate as `(latitude, longitude)` when both are known.
    #[must_use]
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// The busiest intersections, busiest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopIntersections {
    /// At most ten rows with non-increasing `crash_count`.
    pub intersections: Vec<IntersectionCount>,
    /// Whether the result carried coordinate columns at all. When `false`
    /// only the map view is unavailable.
    pub has_coordinates: bool,
}

/// Crash count in one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    /// Hour 0-23.
    pub hour: u8,
    /// Number of crashes.
    pub crash_count: u64,
}

/// Crash counts for every hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyDistribution {
    /// Exactly 24 points, hour 0 first.
    pub points: Vec<HourlyPoint>,
}

impl HourlyDistribution {
    /// The busiest hour; the earliest one on ties.
    #[must_use]
    pub fn peak(&self) -> Option<HourlyPoint> {
        first_max(self.points.iter().copied(), |p| p.crash_count)
    }

    /// Sum over all hours.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.crash_count).sum()
    }
}

/// The single busiest cell of a [`HeatmapGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPeak {
    /// Day of the cell.
    pub day: DayOfWeek,
    /// Hour of the cell.
    pub hour: u8,
    /// Number of crashes.
    pub crash_count: u64,
}

impl HeatmapPeak {
    /// Callout text, e.g. `Peak: Friday at 17:00 (42 crashes)`.
    #[must_use]
    pub fn callout(&self) -> String {
        format!(
            "Peak: {} at {}:00 ({} crashes)",
            self.day, self.hour, self.crash_count
        )
    }
}

/// Crash counts by day of week and hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapGrid {
    /// Row labels, always Monday through Sunday.
    pub days: Vec<DayOfWeek>,
    /// `counts[day][hour]`, 7 rows of 24.
    pub counts: Vec<Vec<u64>>,
}

impl HeatmapGrid {
    /// An all-zero grid.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            days: DayOfWeek::all().to_vec(),
            counts: vec![vec![0; HOURS_PER_DAY]; DayOfWeek::all().len()],
        }
    }

    /// Count for one cell.
    #[must_use]
    pub fn get(&self, day: DayOfWeek, hour: u8) -> u64 {
        self.counts
            .get(day.index())
            .and_then(|row| row.get(usize::from(hour)))
            .copied()
            .unwrap_or(0)
    }

    /// The busiest cell, first in day-then-hour order on ties.
    #[must_use]
    pub fn peak(&self) -> Option<HeatmapPeak> {
        let cells = self.days.iter().zip(&self.counts).flat_map(|(day, row)| {
            row.iter().enumerate().map(|(hour, &crash_count)| HeatmapPeak {
                day: *day,
                hour: u8::try_from(hour).unwrap_or(u8::MAX),
                crash_count,
            })
        });
        first_max(cells, |c| c.crash_count)
    }
}

/// Crash count in one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    /// Calendar month.
    pub month: Month,
    /// Number of crashes.
    pub crash_count: u64,
}

/// Crash count summed over one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonTotal {
    /// The season.
    pub season: Season,
    /// Sum of its three months.
    pub crash_count: u64,
}

/// Monthly trend and its seasonal roll-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// Twelve points in calendar order; absent months count 0.
    pub months: Vec<MonthlyPoint>,
    /// Four totals: Winter, Spring, Summer, Fall.
    pub seasons: Vec<SeasonTotal>,
}

impl MonthlyTrend {
    /// The busiest month; the earliest one on ties.
    #[must_use]
    pub fn peak(&self) -> Option<MonthlyPoint> {
        first_max(self.months.iter().copied(), |p| p.crash_count)
    }

    /// Sum over all months.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.months.iter().map(|p| p.crash_count).sum()
    }
}

/// Values offered by the year and severity selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct crash years, ascending.
    pub years: Vec<i32>,
    /// Distinct severity categories, ascending.
    pub severities: Vec<String>,
    /// Shown instead of the year selector when years could not be loaded.
    pub year_warning: Option<String>,
    /// Shown instead of the severity selector when categories could not be
    /// loaded.
    pub severity_warning: Option<String>,
}

/// Everything one dashboard render produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// The filters the reports were computed with.
    pub selection: FilterSelection,
    /// Hourly chart style.
    pub chart_style: HourlyChartStyle,
    /// Top intersections section.
    pub top_intersections: ReportSection<TopIntersections>,
    /// Hourly distribution section.
    pub hourly: ReportSection<HourlyDistribution>,
    /// Day x hour heatmap section.
    pub heatmap: ReportSection<HeatmapGrid>,
    /// Monthly and seasonal trends section.
    pub monthly: ReportSection<MonthlyTrend>,
}

/// First item with the maximal key. `Iterator::max_by_key` keeps the last.
fn first_max<T, I, F>(items: I, key: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> u64,
{
    items.into_iter().fold(None, |best, item| match best {
        Some(b) if key(&b) >= key(&item) => Some(b),
        _ => Some(item),
    })
}
