//! Plain table views.

use crash_dashboard_reports_models::{HourlyDistribution, TopIntersections};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Column headers plus rows of JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    /// Column headers.
    pub columns: Vec<String>,
    /// One entry per row, aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl TableView {
    fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
        }
    }
}

/// Street A, street B and crash count per intersection.
#[must_use]
pub fn intersections_table(data: &TopIntersections) -> TableView {
    TableView::new(
        &["INTASTREETNAME", "INTBSTREETNAME", "crash_count"],
        data.intersections
            .iter()
            .map(|i| vec![json!(i.street_a), json!(i.street_b), json!(i.crash_count)])
            .collect(),
    )
}

/// The 24-row hourly table, also used for the CSV export.
#[must_use]
pub fn hourly_table(data: &HourlyDistribution) -> TableView {
    TableView::new(
        &["HOUR", "crash_count"],
        data.points
            .iter()
            .map(|p| vec![json!(p.hour), json!(p.crash_count)])
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use crash_dashboard_reports_models::{HourlyPoint, IntersectionCount};

    use super::*;

    #[test]
    fn intersections_table_drops_coordinates() {
        let data = TopIntersections {
            intersections: vec![IntersectionCount {
                street_a: "A".to_string(),
                street_b: "B".to_string(),
                crash_count: 3,
                latitude: Some(1.0),
                longitude: Some(2.0),
            }],
            has_coordinates: true,
        };
        let table = intersections_table(&data);
        assert_eq!(table.columns, ["INTASTREETNAME", "INTBSTREETNAME", "crash_count"]);
        assert_eq!(table.rows, vec![vec![json!("A"), json!("B"), json!(3)]]);
    }

    #[test]
    fn hourly_table_has_one_row_per_hour() {
        let data = HourlyDistribution {
            points: (0..24)
                .map(|hour| HourlyPoint {
                    hour,
                    crash_count: 1,
                })
                .collect(),
        };
        let table = hourly_table(&data);
        assert_eq!(table.rows.len(), 24);
        assert_eq!(table.rows[23], vec![json!(23), json!(1)]);
    }
}
