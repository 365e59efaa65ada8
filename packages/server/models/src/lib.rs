#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crash dashboard server.
//!
//! Report bodies themselves are the section views from the render crate;
//! this crate holds the query parameters and the small envelope types.

use crash_dashboard_reports_models::HourlyChartStyle;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body for non-200 responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}

/// Response to clearing the result cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCacheCleared {
    /// Entries that were dropped.
    pub cleared: usize,
}

/// Query parameters shared by the dashboard page and report endpoints.
///
/// `years` and `severities` repeat once per selected value
/// (`severities=Fatal&severities=Injury`). An absent parameter means "every
/// available option"; a single empty value means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQueryParams {
    /// Raw year values in request order.
    pub years: Option<Vec<String>>,
    /// Raw severity categories in request order.
    pub severities: Option<Vec<String>>,
    /// Hourly chart style: `line`, `bar` or `area`.
    pub style: Option<String>,
}

impl ReportQueryParams {
    /// Parses a URL query string. Unknown keys are ignored and the last
    /// `style` wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "years" => push_value(&mut params.years, &value),
                "severities" => push_value(&mut params.severities, &value),
                "style" => params.style = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Requested years, or `None` when the parameter is absent or none of
    /// its values is an integer. Individual non-integer values are dropped.
    #[must_use]
    pub fn requested_years(&self) -> Option<Vec<i32>> {
        let raw = self.years.as_ref()?;
        let years: Vec<i32> = raw.iter().filter_map(|y| y.parse().ok()).collect();
        if years.is_empty() && !raw.is_empty() {
            return None;
        }
        Some(years)
    }

    /// Requested severity categories, or `None` when the parameter is
    /// absent.
    #[must_use]
    pub fn requested_severities(&self) -> Option<Vec<String>> {
        self.severities.clone()
    }

    /// Requested chart style; unknown or absent values fall back to the
    /// default line chart.
    #[must_use]
    pub fn chart_style(&self) -> HourlyChartStyle {
        self.style
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }
}

/// Marks `list` present and keeps `value` unless it is blank.
fn push_value(list: &mut Option<Vec<String>>, value: &str) {
    let values = list.get_or_insert_with(Vec::new);
    let value = value.trim();
    if !value.is_empty() {
        values.push(value.to_string());
    }
}
