//! Typed reads from warehouse rows.

use crash_dashboard_warehouse_models::{Row, ScalarValue, TabularResult};

use crate::ReportError;

/// Fails with [`ReportError::Empty`] for an empty result, or
/// [`ReportError::MissingColumn`] naming the first absent column.
///
/// # Errors
///
/// See above.
pub fn require(table: &TabularResult, columns: &[&str]) -> Result<(), ReportError> {
    if table.is_empty() {
        return Err(ReportError::Empty);
    }
    if let Some(column) = table.first_missing_column(columns) {
        return Err(ReportError::MissingColumn {
            column: column.to_string(),
        });
    }
    Ok(())
}

/// Reads a non-negative count. Null counts as 0.
///
/// # Errors
///
/// Returns [`ReportError::InvalidValue`] for negative or non-numeric values.
pub fn count(row: &Row, column: &str) -> Result<u64, ReportError> {
    match row.get(column) {
        None | Some(ScalarValue::Null) => Ok(0),
        Some(value) => value
            .as_i64()
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| ReportError::InvalidValue {
                column: column.to_string(),
                message: format!("expected a non-negative count, got {value}"),
            }),
    }
}

/// Reads an optional integer. Null or non-integral values yield `None`.
#[must_use]
pub fn int(row: &Row, column: &str) -> Option<i64> {
    row.get(column).and_then(ScalarValue::as_i64)
}

/// Reads an optional finite float.
#[must_use]
pub fn float(row: &Row, column: &str) -> Option<f64> {
    row.get(column)
        .and_then(ScalarValue::as_f64)
        .filter(|v| v.is_finite())
}

/// Reads an optional string.
#[must_use]
pub fn text<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column).and_then(ScalarValue::as_str)
}
