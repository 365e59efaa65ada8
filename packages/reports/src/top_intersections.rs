//! Intersections with the most crashes.

use crash_dashboard_query::columns::{
    CRASH_COUNT, MEAN_LATITUDE, MEAN_LONGITUDE, STREET_A, STREET_B,
};
use crash_dashboard_query::requests::TOP_INTERSECTIONS_LIMIT;
use crash_dashboard_query::{AggregationRequest, TableRef, WhereFragment, requests};
use crash_dashboard_reports_models::{IntersectionCount, ReportSection, TopIntersections};
use crash_dashboard_warehouse::QueryExecutor;
use crash_dashboard_warehouse_models::TabularResult;

use crate::{ReportError, extract, run_report};

/// Shown when the report has no data.
pub const ERROR_MESSAGE: &str = "Could not load intersection data.";

/// The top-intersections request.
#[must_use]
pub fn request(table: &TableRef, filter: &WhereFragment) -> AggregationRequest {
    requests::top_intersections(table, filter)
}

/// Reshapes the warehouse result.
///
/// Rows are re-sorted by descending count (stable, so warehouse order is
/// kept among equals) and capped at ten. A result without mean-coordinate
/// columns still succeeds with `has_coordinates` unset.
///
/// # Errors
///
/// Returns [`ReportError`] for an empty result, a missing street or count
/// column, or a row with a null street name or invalid count.
pub fn build(table: &TabularResult) -> Result<TopIntersections, ReportError> {
    extract::require(table, &[STREET_A, STREET_B, CRASH_COUNT])?;

    let has_coordinates = table.has_column(MEAN_LATITUDE) && table.has_column(MEAN_LONGITUDE);
    if !has_coordinates {
        log::warn!("Intersection result has no coordinate columns; map view disabled");
    }

    let mut intersections = table
        .rows()
        .iter()
        .map(|row| -> Result<IntersectionCount, ReportError> {
            let street = |column: &str| {
                extract::text(row, column)
                    .map(str::to_string)
                    .ok_or_else(|| ReportError::InvalidValue {
                        column: column.to_string(),
                        message: "street name is null".to_string(),
                    })
            };
            Ok(IntersectionCount {
                street_a: street(STREET_A)?,
                street_b: street(STREET_B)?,
                crash_count: extract::count(row, CRASH_COUNT)?,
                latitude: extract::float(row, MEAN_LATITUDE),
                longitude: extract::float(row, MEAN_LONGITUDE),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    intersections.sort_by(|a, b| b.crash_count.cmp(&a.crash_count));
    intersections.truncate(TOP_INTERSECTIONS_LIMIT as usize);

    Ok(TopIntersections {
        intersections,
        has_coordinates,
    })
}

/// Runs the report.
pub fn run(
    executor: &dyn QueryExecutor,
    table: &TableRef,
    filter: &WhereFragment,
) -> ReportSection<TopIntersections> {
    run_report(executor, &request(table, filter).sql(), ERROR_MESSAGE, build)
}

#[cfg(test)]
mod tests {
    use crash_dashboard_crash_models::FilterSelection;
    use crash_dashboard_warehouse_models::{QueryOutcome, ScalarValue};

    use super::*;
    use crate::testing::{CannedExecutor, failed, table};

    const COLUMNS: &[&str] = &[STREET_A, STREET_B, CRASH_COUNT, MEAN_LATITUDE, MEAN_LONGITUDE];

    fn intersection(a: &str, b: &str, n: i64) -> Vec<ScalarValue> {
        vec![
            ScalarValue::from(a),
            ScalarValue::from(b),
            ScalarValue::Int(n),
            ScalarValue::Float(37.3),
            ScalarValue::Float(-121.9),
        ]
    }

    fn run_with(outcome: QueryOutcome) -> ReportSection<TopIntersections> {
        let executor = CannedExecutor::new().on("SELECT INTASTREETNAME", outcome);
        let table_ref = TableRef::new("processed_crash_data").unwrap();
        run(
            &executor,
            &table_ref,
            &WhereFragment::from_selection(&FilterSelection::default()),
        )
    }

    #[test]
    fn caps_at_ten_rows_in_descending_order() {
        let rows = (0..12)
            .map(|i| intersection(&format!("A{i}"), "B", i * 3 % 7))
            .collect();
        let section = run_with(table(COLUMNS, rows));
        let data = section.data().unwrap();

        assert_eq!(data.intersections.len(), 10);
        assert!(
            data.intersections
                .windows(2)
                .all(|w| w[0].crash_count >= w[1].crash_count)
        );
        assert!(data.has_coordinates);
    }

    #[test]
    fn ties_keep_warehouse_order() {
        let section = run_with(table(
            COLUMNS,
            vec![intersection("X", "Y", 5), intersection("P", "Q", 5)],
        ));
        let labels: Vec<String> = section
            .data()
            .unwrap()
            .intersections
            .iter()
            .map(IntersectionCount::label)
            .collect();
        assert_eq!(labels, ["X & Y", "P & Q"]);
    }

    #[test]
    fn missing_coordinate_columns_only_disable_the_map() {
        let section = run_with(table(
            &[STREET_A, STREET_B, CRASH_COUNT],
            vec![vec!["A".into(), "B".into(), ScalarValue::Int(3)]],
        ));
        let data = section.data().unwrap();
        assert!(!data.has_coordinates);
        assert_eq!(data.intersections[0].coordinate(), None);
    }

    #[test]
    fn empty_or_failed_results_show_the_error_state() {
        let empty = run_with(table(COLUMNS, vec![]));
        assert_eq!(empty.error_message(), Some(ERROR_MESSAGE));

        let broken = run_with(failed("Error executing query: no such table"));
        assert_eq!(
            broken.error_message(),
            Some("Error executing query: no such table")
        );
    }

    #[test]
    fn missing_count_column_fails_the_report() {
        let section = run_with(table(&[STREET_A, STREET_B], vec![vec!["A".into(), "B".into()]]));
        assert_eq!(
            section.error_message(),
            Some("Missing expected column `crash_count`")
        );
    }
}
