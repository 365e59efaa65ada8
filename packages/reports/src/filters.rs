//! Year and severity options for the filter selectors.

use crash_dashboard_query::columns::{SEVERITY_CATEGORY, YEAR};
use crash_dashboard_query::{TableRef, requests};
use crash_dashboard_reports_models::FilterOptions;
use crash_dashboard_warehouse::QueryExecutor;

use crate::extract;

/// Shown instead of the year selector when no years could be loaded.
pub const YEAR_WARNING: &str = "Could not load year data";
/// Shown instead of the severity selector when no categories could be
/// loaded.
pub const SEVERITY_WARNING: &str = "Could not load severity data";

/// Loads the distinct years and severity categories present in `table`.
///
/// Each list fails independently: a failed or empty lookup leaves its list
/// empty and sets the matching warning. Null values are skipped.
pub fn load_filter_options(executor: &dyn QueryExecutor, table: &TableRef) -> FilterOptions {
    let years: Vec<i32> = executor
        .execute(&requests::distinct_years(table).sql())
        .rows()
        .iter()
        .filter_map(|row| extract::int(row, YEAR))
        .filter_map(|y| i32::try_from(y).ok())
        .collect();

    let severities: Vec<String> = executor
        .execute(&requests::distinct_severities(table).sql())
        .rows()
        .iter()
        .filter_map(|row| extract::text(row, SEVERITY_CATEGORY))
        .map(str::to_string)
        .collect();

    let year_warning = years.is_empty().then(|| {
        log::warn!("{YEAR_WARNING}");
        YEAR_WARNING.to_string()
    });
    let severity_warning = severities.is_empty().then(|| {
        log::warn!("{SEVERITY_WARNING}");
        SEVERITY_WARNING.to_string()
    });

    FilterOptions {
        years,
        severities,
        year_warning,
        severity_warning,
    }
}

#[cfg(test)]
mod tests {
    use crash_dashboard_warehouse_models::ScalarValue;

    use super::*;
    use crate::testing::{CannedExecutor, failed, table};

    fn table_ref() -> TableRef {
        TableRef::new("processed_crash_data").unwrap()
    }

    #[test]
    fn loads_years_and_severities_skipping_nulls() {
        let executor = CannedExecutor::new()
            .on(
                "SELECT DISTINCT EXTRACT",
                table(
                    &[YEAR],
                    vec![
                        vec![ScalarValue::Int(2021)],
                        vec![ScalarValue::Int(2022)],
                        vec![ScalarValue::Null],
                    ],
                ),
            )
            .on(
                "SELECT DISTINCT SEVERITY_CATEGORY",
                table(
                    &[SEVERITY_CATEGORY],
                    vec![vec!["Fatal".into()], vec!["Injury".into()]],
                ),
            );

        let options = load_filter_options(&executor, &table_ref());
        assert_eq!(options.years, [2021, 2022]);
        assert_eq!(options.severities, ["Fatal", "Injury"]);
        assert_eq!(options.year_warning, None);
        assert_eq!(options.severity_warning, None);
    }

    #[test]
    fn each_lookup_fails_independently() {
        let executor = CannedExecutor::new()
            .on("SELECT DISTINCT EXTRACT", failed("Error executing query: boom"))
            .on(
                "SELECT DISTINCT SEVERITY_CATEGORY",
                table(&[SEVERITY_CATEGORY], vec![vec!["Fatal".into()]]),
            );

        let options = load_filter_options(&executor, &table_ref());
        assert!(options.years.is_empty());
        assert_eq!(options.year_warning.as_deref(), Some(YEAR_WARNING));
        assert_eq!(options.severities, ["Fatal"]);
        assert_eq!(options.severity_warning, None);
    }
}
