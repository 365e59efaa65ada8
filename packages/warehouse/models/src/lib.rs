#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tabular result types returned by the crash warehouse.
//!
//! These types are engine-agnostic: the `DuckDB` backend converts its native
//! values into [`ScalarValue`]s, and the report modules only ever read
//! [`TabularResult`]s.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// SQL `NULL`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Any integer type.
    Int(i64),
    /// Any floating point or decimal type.
    Float(f64),
    /// Text, or any value without a closer representation.
    Text(String),
}

impl ScalarValue {
    /// Returns `true` for [`ScalarValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as an integer.
    ///
    /// Floats convert only when they hold a whole number; text converts when
    /// it parses as one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null | Self::Bool(_) | Self::Float(_) => None,
        }
    }

    /// Returns the value as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null | Self::Bool(_) => None,
        }
    }

    /// Returns the value as text, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One result row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: BTreeMap<String, ScalarValue>,
}

impl Row {
    /// Returns the value of `column`, or `None` if the row has no such
    /// column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ScalarValue> {
        self.values.get(column)
    }

    /// Sets the value of `column`.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<ScalarValue>) {
        self.values.insert(column.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<ScalarValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An ordered sequence of uniformly shaped rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabularResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TabularResult {
    /// Creates a result with the given column names and rows.
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Column names in the order the warehouse returned them.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns `true` if the result has a column named `name`.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Returns the first of `names` that is not a column of this result.
    #[must_use]
    pub fn first_missing_column<'a>(&self, names: &[&'a str]) -> Option<&'a str> {
        names.iter().copied().find(|name| !self.has_column(name))
    }

    /// The rows, in warehouse order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Result of running one aggregation request through the data access layer.
///
/// Keeps "the query failed" apart from "the query matched nothing", which a
/// bare [`TabularResult`] cannot express.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The warehouse answered (possibly with zero rows).
    Loaded(Arc<TabularResult>),
    /// The request could not be executed.
    Failed {
        /// User-presentable description of the failure.
        message: String,
    },
}

impl QueryOutcome {
    /// Returns the rows, or an empty slice when the request failed.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Loaded(table) => table.rows(),
            Self::Failed { .. } => &[],
        }
    }

    /// Returns `true` if the warehouse answered.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Returns the table, or the failure message.
    ///
    /// # Errors
    ///
    /// Returns the failure message when the request failed.
    pub fn into_result(self) -> Result<Arc<TabularResult>, String> {
        match self {
            Self::Loaded(table) => Ok(table),
            Self::Failed { message } => Err(message),
        }
    }
}
