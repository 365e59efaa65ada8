//! Immutable aggregation requests and their SQL rendering.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{QueryError, WhereFragment};

/// A validated, possibly schema-qualified table name.
///
/// Each dot-separated part is rendered as a double-quoted identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    parts: Vec<String>,
}

impl TableRef {
    /// Parses a table name such as `processed_crash_data` or
    /// `crash_data.processed_crash_data`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidIdentifier`] if any part is empty or
    /// contains a double quote.
    pub fn new(name: &str) -> Result<Self, QueryError> {
        let parts: Vec<String> = name.split('.').map(|p| p.trim().to_string()).collect();

        for part in &parts {
            if part.is_empty() {
                return Err(QueryError::InvalidIdentifier {
                    identifier: name.to_string(),
                    message: "empty identifier part".to_string(),
                });
            }
            if part.contains('"') {
                return Err(QueryError::InvalidIdentifier {
                    identifier: name.to_string(),
                    message: "identifiers may not contain '\"'".to_string(),
                });
            }
        }

        Ok(Self { parts })
    }
}

impl std::str::FromStr for TableRef {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_char('.')?;
            }
            write!(f, "\"{part}\"")?;
        }
        Ok(())
    }
}

/// A grouping/filtering query against the crash table.
///
/// Built once through [`AggregationRequest::builder`] and never mutated
/// afterwards. Its [`Display`](std::fmt::Display) output is the exact SQL
/// text sent to the warehouse and used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregationRequest {
    distinct: bool,
    fields: Vec<String>,
    table: TableRef,
    filter: Option<WhereFragment>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u32>,
}

impl AggregationRequest {
    /// Starts a request against `table`.
    #[must_use]
    pub fn builder(table: &TableRef) -> AggregationRequestBuilder {
        AggregationRequestBuilder {
            request: Self {
                distinct: false,
                fields: Vec::new(),
                table: table.clone(),
                filter: None,
                group_by: Vec::new(),
                order_by: Vec::new(),
                limit: None,
            },
        }
    }

    /// Selected expressions, including their aliases.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Grouping keys.
    #[must_use]
    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    /// Row limit, if any.
    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// The shared filter fragment, if one was attached.
    #[must_use]
    pub const fn filter(&self) -> Option<&WhereFragment> {
        self.filter.as_ref()
    }

    /// Renders the request as SQL text.
    #[must_use]
    pub fn sql(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for AggregationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let select = if self.distinct {
            "SELECT DISTINCT"
        } else {
            "SELECT"
        };
        write!(f, "{select} {}\nFROM {}", self.fields.join(", "), self.table)?;

        if let Some(filter) = &self.filter {
            write!(f, "\nWHERE {filter}")?;
        }
        if !self.group_by.is_empty() {
            write!(f, "\nGROUP BY {}", self.group_by.join(", "))?;
        }
        if !self.order_by.is_empty() {
            write!(f, "\nORDER BY {}", self.order_by.join(", "))?;
        }
        if let Some(limit) = self.limit {
            write!(f, "\nLIMIT {limit}")?;
        }
        Ok(())
    }
}

/// Builder for [`AggregationRequest`].
#[derive(Debug, Clone)]
#[must_use]
pub struct AggregationRequestBuilder {
    request: AggregationRequest,
}

impl AggregationRequestBuilder {
    /// Emits `SELECT DISTINCT`.
    pub const fn distinct(mut self) -> Self {
        self.request.distinct = true;
        self
    }

    /// Adds a selected expression (e.g. `"COUNT(*) as crash_count"`).
    pub fn field(mut self, expr: impl Into<String>) -> Self {
        self.request.fields.push(expr.into());
        self
    }

    /// Attaches the shared WHERE fragment.
    pub fn filter(mut self, fragment: &WhereFragment) -> Self {
        self.request.filter = Some(fragment.clone());
        self
    }

    /// Adds a grouping key.
    pub fn group_by(mut self, expr: impl Into<String>) -> Self {
        self.request.group_by.push(expr.into());
        self
    }

    /// Adds an ordering expression.
    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.request.order_by.push(expr.into());
        self
    }

    /// Caps the number of returned rows.
    pub const fn limit(mut self, limit: u32) -> Self {
        self.request.limit = Some(limit);
        self
    }

    /// Finishes the request.
    #[must_use]
    pub fn build(self) -> AggregationRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use crash_dashboard_crash_models::FilterSelection;

    use super::*;

    #[test]
    fn table_ref_quotes_every_part() {
        let table = TableRef::new("crash_data.processed_crash_data").unwrap();
        assert_eq!(table.to_string(), "\"crash_data\".\"processed_crash_data\"");
    }

    #[test]
    fn table_ref_rejects_bad_identifiers() {
        assert!(TableRef::new("").is_err());
        assert!(TableRef::new("a..b").is_err());
        assert!(TableRef::new("evil\"; DROP TABLE x; --").is_err());
    }

    #[test]
    fn renders_every_clause_in_order() {
        let table = TableRef::new("crashes").unwrap();
        let fragment = WhereFragment::from_selection(&FilterSelection::default());
        let request = AggregationRequest::builder(&table)
            .field("HOUR")
            .field("COUNT(*) as crash_count")
            .filter(&fragment)
            .group_by("HOUR")
            .order_by("HOUR")
            .limit(5)
            .build();

        assert_eq!(
            request.sql(),
            "SELECT HOUR, COUNT(*) as crash_count\n\
             FROM \"crashes\"\n\
             WHERE INTASTREETNAME IS NOT NULL AND INTBSTREETNAME IS NOT NULL\n\
             GROUP BY HOUR\n\
             ORDER BY HOUR\n\
             LIMIT 5"
        );
        assert_eq!(request.limit(), Some(5));
        assert_eq!(request.group_by(), ["HOUR"]);
    }

    #[test]
    fn distinct_request_without_filter() {
        let table = TableRef::new("crashes").unwrap();
        let request = AggregationRequest::builder(&table)
            .distinct()
            .field("SEVERITY_CATEGORY")
            .order_by("SEVERITY_CATEGORY")
            .build();

        assert_eq!(
            request.sql(),
            "SELECT DISTINCT SEVERITY_CATEGORY\nFROM \"crashes\"\nORDER BY SEVERITY_CATEGORY"
        );
        assert!(request.filter().is_none());
    }
}
