//! One full dashboard render.

use crash_dashboard_crash_models::FilterSelection;
use crash_dashboard_query::{TableRef, WhereFragment};
use crash_dashboard_reports_models::{Dashboard, HourlyChartStyle};
use crash_dashboard_warehouse::QueryExecutor;

use crate::{heatmap, hourly, monthly, top_intersections};

/// Builds the shared filter once and runs the four reports in turn.
///
/// Reports run sequentially and independently; a failed report yields a
/// failed section and the rest still run.
pub fn build_dashboard(
    executor: &dyn QueryExecutor,
    table: &TableRef,
    selection: &FilterSelection,
    chart_style: HourlyChartStyle,
) -> Dashboard {
    let filter = WhereFragment::from_selection(selection);
    log::debug!("Rendering dashboard with filter: {filter}");

    Dashboard {
        selection: selection.clone(),
        chart_style,
        top_intersections: top_intersections::run(executor, table, &filter),
        hourly: hourly::run(executor, table, &filter),
        heatmap: heatmap::run(executor, table, &filter),
        monthly: monthly::run(executor, table, &filter),
    }
}

#[cfg(test)]
mod tests {
    use crash_dashboard_query::columns::{CRASH_COUNT, HOUR, MONTH_NAME};
    use crash_dashboard_warehouse_models::ScalarValue;

    use super::*;
    use crate::testing::{CannedExecutor, failed, table};

    #[test]
    fn one_failing_report_does_not_affect_the_others() {
        let executor = CannedExecutor::new()
            .on("SELECT INTASTREETNAME", failed("Error executing query: timeout"))
            .on(
                "SELECT HOUR,",
                table(
                    &[HOUR, CRASH_COUNT],
                    vec![vec![ScalarValue::Int(8), ScalarValue::Int(50)]],
                ),
            )
            .on("SELECT DAYOFWEEKNAME", table(&[], vec![]))
            .on(
                "SELECT MONTHNAME",
                table(
                    &[MONTH_NAME, CRASH_COUNT],
                    vec![vec!["June".into(), ScalarValue::Int(4)]],
                ),
            );
        let table_ref = TableRef::new("processed_crash_data").unwrap();

        let dashboard = build_dashboard(
            &executor,
            &table_ref,
            &FilterSelection::default(),
            HourlyChartStyle::Bar,
        );

        assert_eq!(
            dashboard.top_intersections.error_message(),
            Some("Error executing query: timeout")
        );
        assert_eq!(dashboard.hourly.data().unwrap().points[8].crash_count, 50);
        assert_eq!(
            dashboard.heatmap.error_message(),
            Some(heatmap::ERROR_MESSAGE)
        );
        assert_eq!(dashboard.monthly.data().unwrap().total(), 4);
        assert_eq!(dashboard.chart_style, HourlyChartStyle::Bar);
    }

    #[test]
    fn every_report_shares_the_same_where_fragment() {
        let executor = CannedExecutor::new();
        let selection = FilterSelection::new([2023, 2021], ["Fatal".to_string()]);
        let table_ref = TableRef::new("processed_crash_data").unwrap();

        build_dashboard(&executor, &table_ref, &selection, HourlyChartStyle::Line);

        let expected = format!("WHERE {}", WhereFragment::from_selection(&selection));
        let requests = executor.requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        assert!(requests.iter().all(|sql| sql.contains(&expected)));
        assert!(expected.contains("IN (2021, 2023)"));
    }
}
