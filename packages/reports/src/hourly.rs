//! Crash counts per hour of the day.

use crash_dashboard_query::columns::{CRASH_COUNT, HOUR};
use crash_dashboard_query::{AggregationRequest, TableRef, WhereFragment, requests};
use crash_dashboard_reports_models::{
    HOURS_PER_DAY, HourlyDistribution, HourlyPoint, ReportSection,
};
use crash_dashboard_warehouse::QueryExecutor;
use crash_dashboard_warehouse_models::TabularResult;

use crate::{ReportError, extract, run_report};

/// Shown when the report has no data.
pub const ERROR_MESSAGE: &str = "Could not load hourly crash data.";

/// The hourly request.
#[must_use]
pub fn request(table: &TableRef, filter: &WhereFragment) -> AggregationRequest {
    requests::hourly(table, filter)
}

/// Fills every hour 0-23, using 0 where the warehouse returned nothing.
/// Null or out-of-range hours are dropped.
///
/// # Errors
///
/// Returns [`ReportError`] for an empty result, a missing column or an
/// invalid count.
pub fn build(table: &TabularResult) -> Result<HourlyDistribution, ReportError> {
    extract::require(table, &[HOUR, CRASH_COUNT])?;

    let mut counts = [0_u64; HOURS_PER_DAY];
    for row in table.rows() {
        let Some(hour) = extract::int(row, HOUR)
            .and_then(|h| usize::try_from(h).ok())
            .filter(|&h| h < HOURS_PER_DAY)
        else {
            log::debug!("Ignoring hourly row with hour {:?}", row.get(HOUR));
            continue;
        };
        counts[hour] += extract::count(row, CRASH_COUNT)?;
    }

    Ok(HourlyDistribution {
        points: (0_u8..)
            .zip(counts)
            .map(|(hour, crash_count)| HourlyPoint { hour, crash_count })
            .collect(),
    })
}

/// Runs the report.
pub fn run(
    executor: &dyn QueryExecutor,
    table: &TableRef,
    filter: &WhereFragment,
) -> ReportSection<HourlyDistribution> {
    run_report(executor, &request(table, filter).sql(), ERROR_MESSAGE, build)
}

#[cfg(test)]
mod tests {
    use crash_dashboard_warehouse_models::ScalarValue;

    use super::*;
    use crate::testing;

    fn result(rows: Vec<Vec<ScalarValue>>) -> TabularResult {
        testing::result(&[HOUR, CRASH_COUNT], rows)
    }

    #[test]
    fn single_hour_is_expanded_to_a_full_day() {
        let data = build(&result(vec![vec![ScalarValue::Int(8), ScalarValue::Int(50)]])).unwrap();

        assert_eq!(data.points.len(), 24);
        for point in &data.points {
            let expected = if point.hour == 8 { 50 } else { 0 };
            assert_eq!(point.crash_count, expected, "hour {}", point.hour);
        }
        assert_eq!(data.peak().unwrap().hour, 8);
    }

    #[test]
    fn hours_are_in_order_regardless_of_input_order() {
        let data = build(&result(vec![
            vec![ScalarValue::Int(23), ScalarValue::Int(1)],
            vec![ScalarValue::Int(0), ScalarValue::Int(2)],
        ]))
        .unwrap();
        let hours: Vec<u8> = data.points.iter().map(|p| p.hour).collect();
        assert_eq!(hours, (0..24).collect::<Vec<u8>>());
        assert_eq!(data.points[0].crash_count, 2);
        assert_eq!(data.points[23].crash_count, 1);
    }

    #[test]
    fn null_and_out_of_range_hours_are_ignored() {
        let data = build(&result(vec![
            vec![ScalarValue::Null, ScalarValue::Int(9)],
            vec![ScalarValue::Int(24), ScalarValue::Int(9)],
            vec![ScalarValue::Int(-1), ScalarValue::Int(9)],
            vec![ScalarValue::Int(12), ScalarValue::Int(4)],
        ]))
        .unwrap();
        assert_eq!(data.total(), 4);
    }

    #[test]
    fn empty_result_is_an_error() {
        assert_eq!(build(&result(vec![])), Err(ReportError::Empty));
    }
}
