//! `report` subcommand: every report as plain text.

use crash_dashboard_crash_models::FilterSelection;
use crash_dashboard_render::text::render_text_summary;
use crash_dashboard_reports::{build_dashboard, load_filter_options};
use crash_dashboard_reports_models::HourlyChartStyle;
use crash_dashboard_warehouse::{
    CachedWarehouse, DuckDbWarehouse, WarehouseConfig, WarehouseError,
};

/// Opens the warehouse read-only, resolves the filters (absent means every
/// available option) and renders the dashboard as text.
pub fn run(
    config: &WarehouseConfig,
    years: Option<Vec<i32>>,
    severities: Option<Vec<String>>,
) -> Result<String, WarehouseError> {
    let warehouse = DuckDbWarehouse::open(&config.db_path, 1, true)?;
    let executor = CachedWarehouse::new(warehouse, config.cache_ttl);

    let options = load_filter_options(&executor, &config.table);
    let selection =
        FilterSelection::resolve(years, severities, &options.years, &options.severities);
    let dashboard = build_dashboard(
        &executor,
        &config.table,
        &selection,
        HourlyChartStyle::default(),
    );

    Ok(render_text_summary(&dashboard))
}

#[cfg(test)]
mod tests {
    use crash_dashboard_cli_utils::MultiProgress;

    use super::*;

    const CRASHES: &str = "\
DATE,HOUR,SEVERITY_CATEGORY,INTASTREETNAME,INTBSTREETNAME
2021-01-04,8,Injury,1ST ST,SANTA CLARA ST
2022-03-05,17,Fatal,KING RD,STORY RD
not a date,1,Injury,ALMADEN BLVD,PARK AV
";

    #[test]
    fn loads_a_csv_then_reports_on_it() {
        let dir = std::env::temp_dir().join(format!("crash_dashboard_cli_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let csv = dir.join("crashes.csv");
        std::fs::write(&csv, CRASHES).unwrap();

        let mut config = WarehouseConfig::from_lookup(|_| None).unwrap();
        config.db_path = dir.join("warehouse").join("crashes.duckdb");

        let summary = crate::load::run(&config, &csv, true, &MultiProgress::new()).unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.skipped, 1);

        let text = run(&config, Some(vec![2021]), None).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert!(text.contains("Years: 2021\n"));
        assert!(text.contains("1ST ST & SANTA CLARA ST"));
        assert!(!text.contains("KING RD & STORY RD"));
        assert!(text.contains("Peak: 1 crashes at 08:00"));
    }

    #[test]
    fn missing_warehouse_is_an_error() {
        let mut config = WarehouseConfig::from_lookup(|_| None).unwrap();
        config.db_path = std::env::temp_dir().join("crash_dashboard_missing/none.duckdb");
        assert!(run(&config, None, None).is_err());
    }
}
