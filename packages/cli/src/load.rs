//! `load` subcommand: fills the warehouse from a crash CSV export.

use std::path::Path;

use crash_dashboard_cli_utils::{IndicatifProgress, MultiProgress};
use crash_dashboard_warehouse::{
    DuckDbWarehouse, LoadSummary, WarehouseConfig, WarehouseError, load,
};

/// Creates the crash table (dropping it first with `replace`) and loads
/// `csv` into it with a byte progress bar.
pub fn run(
    config: &WarehouseConfig,
    csv: &Path,
    replace: bool,
    multi: &MultiProgress,
) -> Result<LoadSummary, WarehouseError> {
    if let Some(parent) = config.db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let warehouse = DuckDbWarehouse::open(&config.db_path, 1, false)?;
    let mut conn = warehouse.acquire()?;
    load::create_table(&conn, &config.table, replace)?;

    let progress = IndicatifProgress::bytes_bar(multi, "Reading crash CSV");
    let summary = load::load_csv(&mut conn, &config.table, csv, progress.as_ref())?;

    log::info!(
        "Loaded {} crashes into {} ({} skipped)",
        summary.inserted,
        config.table,
        summary.skipped
    );
    Ok(summary)
}
