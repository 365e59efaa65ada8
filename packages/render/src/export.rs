//! CSV download of the hourly distribution.

use crash_dashboard_reports_models::HourlyDistribution;

use crate::RenderError;

/// File name offered for the hourly download.
pub const HOURLY_CSV_FILENAME: &str = "hourly_crash_data.csv";

/// Writes the 24-row hourly table as CSV with a `HOUR,crash_count` header.
///
/// # Errors
///
/// Returns [`RenderError`] if the CSV writer fails.
pub fn hourly_csv(data: &HourlyDistribution) -> Result<String, RenderError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["HOUR", "crash_count"])?;
    for point in &data.points {
        writer.write_record([point.hour.to_string(), point.crash_count.to_string()])?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
