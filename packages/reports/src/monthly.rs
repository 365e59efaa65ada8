//! Monthly crash trend and its seasonal roll-up.

use crash_dashboard_crash_models::{Month, Season};
use crash_dashboard_query::columns::{CRASH_COUNT, MONTH_NAME};
use crash_dashboard_query::{AggregationRequest, TableRef, WhereFragment, requests};
use crash_dashboard_reports_models::{MonthlyPoint, MonthlyTrend, ReportSection, SeasonTotal};
use crash_dashboard_warehouse::QueryExecutor;
use crash_dashboard_warehouse_models::TabularResult;

use crate::{ReportError, extract, run_report};

/// Shown when the report has no data.
pub const ERROR_MESSAGE: &str = "Could not load monthly crash data.";

/// The monthly request.
#[must_use]
pub fn request(table: &TableRef, filter: &WhereFragment) -> AggregationRequest {
    requests::monthly(table, filter)
}

/// Places the counts on the twelve calendar months and sums each season.
///
/// Months absent from the result count 0. Unknown month names are dropped.
///
/// # Errors
///
/// Returns [`ReportError`] for an empty result, a missing column or an
/// invalid count.
pub fn build(table: &TabularResult) -> Result<MonthlyTrend, ReportError> {
    extract::require(table, &[MONTH_NAME, CRASH_COUNT])?;

    let mut counts = [0_u64; 12];
    for row in table.rows() {
        let Some(month) = extract::text(row, MONTH_NAME).and_then(|m| m.parse::<Month>().ok())
        else {
            log::debug!("Ignoring monthly row {:?}", row.get(MONTH_NAME));
            continue;
        };
        counts[month.index()] += extract::count(row, CRASH_COUNT)?;
    }

    Ok(MonthlyTrend {
        months: Month::all()
            .iter()
            .map(|&month| MonthlyPoint {
                month,
                crash_count: counts[month.index()],
            })
            .collect(),
        seasons: Season::all()
            .iter()
            .map(|&season| SeasonTotal {
                season,
                crash_count: season.months().iter().map(|m| counts[m.index()]).sum(),
            })
            .collect(),
    })
}

/// Runs the report.
pub fn run(
    executor: &dyn QueryExecutor,
    table: &TableRef,
    filter: &WhereFragment,
) -> ReportSection<MonthlyTrend> {
    run_report(executor, &request(table, filter).sql(), ERROR_MESSAGE, build)
}
