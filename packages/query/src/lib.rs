#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation request builder for the crash dashboard.
//!
//! The analyst's [`FilterSelection`] is turned into one shared
//! [`WhereFragment`] per render. Every report appends that same fragment to
//! its own [`AggregationRequest`], whose rendered SQL text doubles as the
//! result-cache key in the warehouse layer.
//!
//! [`FilterSelection`]: crash_dashboard_crash_models::FilterSelection

pub mod columns;
pub mod filter;
pub mod request;
pub mod requests;

pub use filter::WhereFragment;
pub use request::{AggregationRequest, AggregationRequestBuilder, TableRef};

use thiserror::Error;

/// Errors that can occur while building a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A table identifier could not be safely quoted.
    #[error("Invalid table identifier '{identifier}': {message}")]
    InvalidIdentifier {
        /// The rejected identifier.
        identifier: String,
        /// Why it was rejected.
        message: String,
    },
}

/// Quotes a string literal for inclusion in SQL, doubling embedded single
/// quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
