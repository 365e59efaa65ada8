//! Crash counts by day of week and hour.

use crash_dashboard_crash_models::DayOfWeek;
use crash_dashboard_query::columns::{CRASH_COUNT, DAY_OF_WEEK_NAME, HOUR};
use crash_dashboard_query::{AggregationRequest, TableRef, WhereFragment, requests};
use crash_dashboard_reports_models::{HOURS_PER_DAY, HeatmapGrid, ReportSection};
use crash_dashboard_warehouse::QueryExecutor;
use crash_dashboard_warehouse_models::TabularResult;

use crate::{ReportError, extract, run_report};

/// Shown when the report has no data.
pub const ERROR_MESSAGE: &str = "Could not load day-hour heatmap data.";

/// The day-by-hour request.
#[must_use]
pub fn request(table: &TableRef, filter: &WhereFragment) -> AggregationRequest {
    requests::day_hour(table, filter)
}

/// Pivots the result into a 7 x 24 grid, Monday first.
///
/// Row order comes from [`DayOfWeek`], not from the result, so missing days
/// still get an all-zero row. Unknown day names and out-of-range hours are
/// dropped.
///
/// # Errors
///
/// Returns [`ReportError`] for an empty result, a missing column or an
/// invalid count.
pub fn build(table: &TabularResult) -> Result<HeatmapGrid, ReportError> {
    extract::require(table, &[DAY_OF_WEEK_NAME, HOUR, CRASH_COUNT])?;

    let mut grid = HeatmapGrid::zeroed();
    for row in table.rows() {
        let day = extract::text(row, DAY_OF_WEEK_NAME).and_then(|d| d.parse::<DayOfWeek>().ok());
        let hour = extract::int(row, HOUR)
            .and_then(|h| usize::try_from(h).ok())
            .filter(|&h| h < HOURS_PER_DAY);

        let (Some(day), Some(hour)) = (day, hour) else {
            log::debug!(
                "Ignoring heatmap cell ({:?}, {:?})",
                row.get(DAY_OF_WEEK_NAME),
                row.get(HOUR)
            );
            continue;
        };
        grid.counts[day.index()][hour] += extract::count(row, CRASH_COUNT)?;
    }

    Ok(grid)
}

/// Runs the report.
pub fn run(
    executor: &dyn QueryExecutor,
    table: &TableRef,
    filter: &WhereFragment,
) -> ReportSection<HeatmapGrid> {
    run_report(executor, &request(table, filter).sql(), ERROR_MESSAGE, build)
}

#[cfg(test)]
mod tests {
    use crash_dashboard_warehouse_models::ScalarValue;

    use super::*;
    use crate::testing;

    fn cell(day: &str, hour: i64, n: i64) -> Vec<ScalarValue> {
        vec![day.into(), ScalarValue::Int(hour), ScalarValue::Int(n)]
    }

    fn result(rows: Vec<Vec<ScalarValue>>) -> TabularResult {
        testing::result(&[DAY_OF_WEEK_NAME, HOUR, CRASH_COUNT], rows)
    }

    #[test]
    fn grid_is_always_seven_by_twenty_four_monday_first() {
        let grid = build(&result(vec![cell("Sunday", 3, 4), cell("Wednesday", 17, 11)])).unwrap();

        assert_eq!(grid.days, DayOfWeek::all());
        assert_eq!(grid.counts.len(), 7);
        assert!(grid.counts.iter().all(|row| row.len() == 24));
        assert_eq!(grid.get(DayOfWeek::Sunday, 3), 4);
        assert_eq!(grid.get(DayOfWeek::Wednesday, 17), 11);
        assert_eq!(grid.counts[DayOfWeek::Monday.index()].iter().sum::<u64>(), 0);
    }

    #[test]
    fn unknown_days_and_hours_are_dropped() {
        let grid = build(&result(vec![
            cell("Caturday", 3, 4),
            cell("Monday", 24, 4),
            cell("Monday", 0, 1),
        ]))
        .unwrap();
        let total: u64 = grid.counts.iter().flatten().sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn peak_callout_uses_first_cell_on_ties() {
        let grid = build(&result(vec![cell("Friday", 17, 8), cell("Monday", 8, 8)])).unwrap();
        assert_eq!(
            grid.peak().unwrap().callout(),
            "Peak: Monday at 8:00 (8 crashes)"
        );
    }

    #[test]
    fn empty_result_is_an_error() {
        assert_eq!(build(&result(vec![])), Err(ReportError::Empty));
    }
}
