#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The four crash dashboard reports.
//!
//! Every report follows the same straight line: build its request from the
//! shared [`WhereFragment`], run it through a [`QueryExecutor`], reshape
//! the returned table into a typed value. Reports never look at each
//! other's output, and a failure in one becomes a
//! [`ReportSection::Failed`] for that report only.
//!
//! [`WhereFragment`]: crash_dashboard_query::WhereFragment
//! [`QueryExecutor`]: crash_dashboard_warehouse::QueryExecutor

pub mod dashboard;
pub mod extract;
pub mod filters;
pub mod heatmap;
pub mod hourly;
pub mod monthly;
pub mod top_intersections;

pub use dashboard::build_dashboard;
pub use filters::load_filter_options;

use crash_dashboard_reports_models::ReportSection;
use crash_dashboard_warehouse::QueryExecutor;
use crash_dashboard_warehouse_models::TabularResult;
use thiserror::Error;

/// Reasons a report could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// The warehouse request failed.
    #[error("{message}")]
    Unavailable {
        /// Failure reported by the data access layer.
        message: String,
    },

    /// The request succeeded but returned no rows.
    #[error("Query returned no rows")]
    Empty,

    /// A column the report reads is absent from the result.
    #[error("Missing expected column `{column}`")]
    MissingColumn {
        /// The absent column.
        column: String,
    },

    /// A value could not be interpreted.
    #[error("Invalid value in column `{column}`: {message}")]
    InvalidValue {
        /// Column holding the value.
        column: String,
        /// What was wrong with it.
        message: String,
    },
}

/// Executes `sql` and reshapes the result with `build`.
///
/// An empty result shows `empty_message`; any other failure shows the
/// error's own text.
fn run_report<T>(
    executor: &dyn QueryExecutor,
    sql: &str,
    empty_message: &str,
    build: impl FnOnce(&TabularResult) -> Result<T, ReportError>,
) -> ReportSection<T> {
    let result = executor
        .execute(sql)
        .into_result()
        .map_err(|message| ReportError::Unavailable { message })
        .and_then(|table| build(&table));

    match result {
        Ok(data) => ReportSection::ready(data),
        Err(ReportError::Empty) => {
            log::warn!("{empty_message}");
            ReportSection::failed(empty_message)
        }
        Err(e) => {
            log::warn!("{empty_message} {e}");
            ReportSection::failed(e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use crash_dashboard_warehouse::QueryExecutor;
    use crash_dashboard_warehouse_models::{QueryOutcome, Row, ScalarValue, TabularResult};

    /// Answers requests by substring match against canned outcomes and
    /// records every request it sees.
    #[derive(Default)]
    pub struct CannedExecutor {
        responses: Vec<(String, QueryOutcome)>,
        pub requests: Mutex<Vec<String>>,
    }

    impl CannedExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answers any request containing `needle` with `outcome`.
        pub fn on(mut self, needle: &str, outcome: QueryOutcome) -> Self {
            self.responses.push((needle.to_string(), outcome));
            self
        }
    }

    impl QueryExecutor for CannedExecutor {
        fn execute(&self, request_text: &str) -> QueryOutcome {
            self.requests.lock().unwrap().push(request_text.to_string());
            self.responses
                .iter()
                .find(|(needle, _)| request_text.contains(needle.as_str()))
                .map_or_else(
                    || QueryOutcome::Failed {
                        message: format!("Error executing query: no canned answer for {request_text}"),
                    },
                    |(_, outcome)| outcome.clone(),
                )
        }
    }

    /// Builds a result from column names and rows of values.
    pub fn result(columns: &[&str], rows: Vec<Vec<ScalarValue>>) -> TabularResult {
        let rows = rows
            .into_iter()
            .map(|values| columns.iter().zip(values).map(|(c, v)| (*c, v)).collect::<Row>())
            .collect();
        TabularResult::new(columns.iter().map(|c| (*c).to_string()).collect(), rows)
    }

    /// Same as [`result`], wrapped as a loaded outcome.
    pub fn table(columns: &[&str], rows: Vec<Vec<ScalarValue>>) -> QueryOutcome {
        QueryOutcome::Loaded(Arc::new(result(columns, rows)))
    }

    pub fn failed(message: &str) -> QueryOutcome {
        QueryOutcome::Failed {
            message: message.to_string(),
        }
    }
}
