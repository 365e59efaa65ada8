//! The shared WHERE fragment.

use crash_dashboard_crash_models::FilterSelection;
use serde::{Deserialize, Serialize};

use crate::{columns, quote_literal};

/// Predicate that keeps only rows with both intersection streets present.
///
/// Only the top-intersections report needs it, but it is part of the one
/// fragment every report shares.
pub const INTERSECTION_NOT_NULL: &str = "INTASTREETNAME IS NOT NULL AND INTBSTREETNAME IS NOT NULL";

/// Conjunction of filter predicates derived from a [`FilterSelection`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WhereFragment {
    clauses: Vec<String>,
}

impl WhereFragment {
    /// Builds the fragment for the given selection.
    ///
    /// The intersection predicate is always present. Year and severity
    /// predicates are added only for non-empty selections, so an `IN ()`
    /// list is never generated.
    #[must_use]
    pub fn from_selection(selection: &FilterSelection) -> Self {
        let mut clauses = vec![INTERSECTION_NOT_NULL.to_string()];

        if let Some(years) = year_list(selection) {
            clauses.push(format!("EXTRACT(YEAR FROM {}) IN ({years})", columns::DATE));
        }

        if let Some(severities) = severity_list(selection) {
            clauses.push(format!("{} IN ({severities})", columns::SEVERITY_CATEGORY));
        }

        Self { clauses }
    }

    /// Returns the individual predicates in the order they are joined.
    #[must_use]
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }
}

impl std::fmt::Display for WhereFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.clauses.join(" AND "))
    }
}

fn year_list(selection: &FilterSelection) -> Option<String> {
    let years: Vec<String> = selection
        .selected_years
        .iter()
        .map(ToString::to_string)
        .collect();
    (!years.is_empty()).then(|| years.join(", "))
}

fn severity_list(selection: &FilterSelection) -> Option<String> {
    let severities: Vec<String> = selection
        .selected_severities
        .iter()
        .map(|s| quote_literal(s))
        .collect();
    (!severities.is_empty()).then(|| severities.join(", "))
}
