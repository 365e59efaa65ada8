//! The concrete requests issued by the dashboard.
//!
//! One function per report plus the two filter-option lookups. Report
//! requests all take the same shared [`WhereFragment`].

use std::fmt::Write as _;

use crash_dashboard_crash_models::{DayOfWeek, Month};

use crate::columns::{
    CRASH_COUNT, DATE, DAY_OF_WEEK_NAME, HOUR, LATITUDE, LONGITUDE, MEAN_LATITUDE,
    MEAN_LONGITUDE, MONTH_NAME, SEVERITY_CATEGORY, STREET_A, STREET_B, YEAR,
};
use crate::{AggregationRequest, TableRef, WhereFragment, quote_literal};

/// Maximum number of intersections in the top-intersections report.
pub const TOP_INTERSECTIONS_LIMIT: u32 = 10;

/// Distinct crash years, ascending.
#[must_use]
pub fn distinct_years(table: &TableRef) -> AggregationRequest {
    AggregationRequest::builder(table)
        .distinct()
        .field(format!("EXTRACT(YEAR FROM {DATE}) as {YEAR}"))
        .order_by(YEAR)
        .build()
}

/// Distinct severity categories, ascending.
#[must_use]
pub fn distinct_severities(table: &TableRef) -> AggregationRequest {
    AggregationRequest::builder(table)
        .distinct()
        .field(SEVERITY_CATEGORY)
        .order_by(SEVERITY_CATEGORY)
        .build()
}

/// Crash count and mean coordinate per intersection, busiest first.
#[must_use]
pub fn top_intersections(table: &TableRef, filter: &WhereFragment) -> AggregationRequest {
    AggregationRequest::builder(table)
        .field(STREET_A)
        .field(STREET_B)
        .field(format!("COUNT(*) as {CRASH_COUNT}"))
        .field(format!("AVG({LATITUDE}) as {MEAN_LATITUDE}"))
        .field(format!("AVG({LONGITUDE}) as {MEAN_LONGITUDE}"))
        .filter(filter)
        .group_by(STREET_A)
        .group_by(STREET_B)
        .order_by(format!("{CRASH_COUNT} DESC"))
        .limit(TOP_INTERSECTIONS_LIMIT)
        .build()
}

/// Crash count per hour of day.
#[must_use]
pub fn hourly(table: &TableRef, filter: &WhereFragment) -> AggregationRequest {
    AggregationRequest::builder(table)
        .field(HOUR)
        .field(format!("COUNT(*) as {CRASH_COUNT}"))
        .filter(filter)
        .group_by(HOUR)
        .order_by(HOUR)
        .build()
}

/// Crash count per (day of week, hour), Monday first then by hour.
#[must_use]
pub fn day_hour(table: &TableRef, filter: &WhereFragment) -> AggregationRequest {
    AggregationRequest::builder(table)
        .field(DAY_OF_WEEK_NAME)
        .field(HOUR)
        .field(format!("COUNT(*) as {CRASH_COUNT}"))
        .filter(filter)
        .group_by(DAY_OF_WEEK_NAME)
        .group_by(HOUR)
        .order_by(day_order_expr())
        .order_by(HOUR)
        .build()
}

/// Crash count per month name, in calendar order.
#[must_use]
pub fn monthly(table: &TableRef, filter: &WhereFragment) -> AggregationRequest {
    AggregationRequest::builder(table)
        .field(MONTH_NAME)
        .field(format!("COUNT(*) as {CRASH_COUNT}"))
        .filter(filter)
        .group_by(MONTH_NAME)
        .order_by(month_order_expr())
        .build()
}

/// `CASE` expression mapping `DAYOFWEEKNAME` to its Monday-first ordinal.
#[must_use]
pub fn day_order_expr() -> String {
    ordinal_case(
        DAY_OF_WEEK_NAME,
        DayOfWeek::all().iter().map(|d| (d.as_ref(), d.ordinal())),
    )
}

/// `CASE` expression mapping `MONTHNAME` to its calendar ordinal.
#[must_use]
pub fn month_order_expr() -> String {
    ordinal_case(
        MONTH_NAME,
        Month::all().iter().map(|m| (m.as_ref(), m.ordinal())),
    )
}

fn ordinal_case<'a>(column: &str, entries: impl Iterator<Item = (&'a str, u8)>) -> String {
    let mut expr = String::from("CASE");
    for (name, ordinal) in entries {
        let _ = write!(
            expr,
            " WHEN {column} = {} THEN {ordinal}",
            quote_literal(name)
        );
    }
    expr.push_str(" END");
    expr
}
