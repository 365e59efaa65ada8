//! Plotly figure specifications.
//!
//! Each builder returns the `data` traces and `layout` object that
//! `Plotly.newPlot` expects. Labels, colour scales and annotations are
//! fixed here so every client draws the same chart.

use crash_dashboard_crash_models::Season;
use crash_dashboard_reports_models::{
    HeatmapGrid, HourlyChartStyle, HourlyDistribution, MonthlyTrend, TopIntersections,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Axis label for crash counts.
const CRASH_AXIS: &str = "Number of Crashes";

/// Highlighted hour band on the hourly chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RushBand {
    /// Band label.
    pub label: &'static str,
    /// First hour.
    pub start: u8,
    /// Last hour.
    pub end: u8,
    /// Fill colour.
    pub color: &'static str,
}

/// The morning and evening rush bands, drawn on every hourly chart.
pub const RUSH_BANDS: [RushBand; 2] = [
    RushBand {
        label: "Morning Rush",
        start: 7,
        end: 9,
        color: "yellow",
    },
    RushBand {
        label: "Evening Rush",
        start: 16,
        end: 19,
        color: "orange",
    },
];

/// Opacity of the rush bands.
pub const RUSH_BAND_OPACITY: f64 = 0.2;

/// A Plotly figure: traces plus layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Plotly traces.
    pub data: Vec<Value>,
    /// Plotly layout.
    pub layout: Value,
}

/// Horizontal bar chart of the busiest intersections, busiest at the top.
#[must_use]
pub fn top_intersections_chart(data: &TopIntersections) -> Figure {
    let labels: Vec<String> = data.intersections.iter().map(|i| i.label()).collect();
    let counts: Vec<u64> = data.intersections.iter().map(|i| i.crash_count).collect();
    // Plotly draws the first category at the bottom.
    let bottom_up: Vec<&String> = labels.iter().rev().collect();

    Figure {
        data: vec![json!({
            "type": "bar",
            "orientation": "h",
            "x": counts,
            "y": labels,
            "marker": {
                "color": counts,
                "colorscale": "Reds",
                "showscale": true,
                "colorbar": { "title": { "text": "crash_count" } },
            },
            "hovertemplate": "%{y}<br>Crashes: %{x}<extra></extra>",
        })],
        layout: json!({
            "title": { "text": "Top 10 Crash Intersections" },
            "height": 500,
            "xaxis": { "title": { "text": CRASH_AXIS } },
            "yaxis": {
                "title": { "text": "Intersection" },
                "categoryorder": "array",
                "categoryarray": bottom_up,
            },
        }),
    }
}

/// Hourly distribution in the chosen style, with rush bands and the peak
/// hour annotated.
#[must_use]
pub fn hourly_chart(data: &HourlyDistribution, style: HourlyChartStyle) -> Figure {
    let hours: Vec<u8> = data.points.iter().map(|p| p.hour).collect();
    let counts: Vec<u64> = data.points.iter().map(|p| p.crash_count).collect();

    let trace = match style {
        HourlyChartStyle::Line => json!({
            "type": "scatter",
            "mode": "lines+markers",
            "x": hours,
            "y": counts,
        }),
        HourlyChartStyle::Bar => json!({
            "type": "bar",
            "x": hours,
            "y": counts,
            "marker": { "color": counts, "colorscale": "Viridis", "showscale": true },
        }),
        HourlyChartStyle::Area => json!({
            "type": "scatter",
            "mode": "lines",
            "fill": "tozeroy",
            "x": hours,
            "y": counts,
        }),
    };

    let shapes: Vec<Value> = RUSH_BANDS
        .iter()
        .map(|band| {
            json!({
                "type": "rect",
                "xref": "x",
                "yref": "paper",
                "x0": band.start,
                "x1": band.end,
                "y0": 0,
                "y1": 1,
                "fillcolor": band.color,
                "opacity": RUSH_BAND_OPACITY,
                "line": { "width": 0 },
                "layer": "below",
            })
        })
        .collect();

    let mut annotations: Vec<Value> = RUSH_BANDS
        .iter()
        .map(|band| {
            json!({
                "x": band.start,
                "xref": "x",
                "xanchor": "left",
                "y": 1,
                "yref": "paper",
                "yanchor": "bottom",
                "text": band.label,
                "showarrow": false,
            })
        })
        .collect();
    if let Some(peak) = data.peak() {
        annotations.push(peak_annotation(json!(peak.hour), peak.crash_count));
    }

    Figure {
        data: vec![trace],
        layout: json!({
            "title": { "text": "Crashes by Hour of Day" },
            "xaxis": { "title": { "text": "Hour (24-hour format)" }, "tickmode": "linear", "dtick": 1 },
            "yaxis": { "title": { "text": CRASH_AXIS } },
            "shapes": shapes,
            "annotations": annotations,
        }),
    }
}

/// Day-by-hour heatmap on a fixed `YlOrRd` scale with every cell labelled.
#[must_use]
pub fn heatmap_chart(grid: &HeatmapGrid) -> Figure {
    let days: Vec<String> = grid.days.iter().map(ToString::to_string).collect();
    let hours: Vec<usize> = (0..grid.counts.first().map_or(0, Vec::len)).collect();

    Figure {
        data: vec![json!({
            "type": "heatmap",
            "z": grid.counts,
            "x": hours,
            "y": days,
            "text": grid.counts,
            "texttemplate": "%{text}",
            "colorscale": "YlOrRd",
            "colorbar": { "title": { "text": "Crash Count" } },
            "hovertemplate": "%{y} %{x}:00<br>Crashes: %{z}<extra></extra>",
        })],
        layout: json!({
            "title": { "text": "Crash Frequency by Day and Hour" },
            "xaxis": {
                "title": { "text": "Hour of Day" },
                "tickmode": "linear",
                "tick0": 0,
                "dtick": 1,
            },
            "yaxis": { "title": { "text": "Day of Week" }, "autorange": "reversed" },
        }),
    }
}

/// Line chart over the twelve months with the peak month annotated.
#[must_use]
pub fn monthly_chart(trend: &MonthlyTrend) -> Figure {
    let months: Vec<String> = trend.months.iter().map(|p| p.month.to_string()).collect();
    let counts: Vec<u64> = trend.months.iter().map(|p| p.crash_count).collect();
    let annotations: Vec<Value> = trend
        .peak()
        .map(|p| peak_annotation(json!(p.month.to_string()), p.crash_count))
        .into_iter()
        .collect();

    Figure {
        data: vec![json!({
            "type": "scatter",
            "mode": "lines+markers",
            "x": months,
            "y": counts,
        })],
        layout: json!({
            "title": { "text": "Crashes by Month" },
            "xaxis": {
                "title": { "text": "Month" },
                "categoryorder": "array",
                "categoryarray": months,
            },
            "yaxis": { "title": { "text": CRASH_AXIS } },
            "annotations": annotations,
        }),
    }
}

/// Four-slice pie of the seasonal totals in fixed season order and colours.
#[must_use]
pub fn seasonal_chart(trend: &MonthlyTrend) -> Figure {
    let labels: Vec<String> = trend.seasons.iter().map(|s| s.season.to_string()).collect();
    let values: Vec<u64> = trend.seasons.iter().map(|s| s.crash_count).collect();
    let colors: Vec<&str> = trend.seasons.iter().map(|s| Season::color(s.season)).collect();

    Figure {
        data: vec![json!({
            "type": "pie",
            "labels": labels,
            "values": values,
            "marker": { "colors": colors },
            "sort": false,
            "direction": "clockwise",
        })],
        layout: json!({
            "title": { "text": "Crash Distribution by Season" },
        }),
    }
}

fn peak_annotation(x: Value, crash_count: u64) -> Value {
    json!({
        "x": x,
        "y": crash_count,
        "text": format!("Peak: {crash_count} crashes"),
        "showarrow": true,
        "arrowhead": 1,
    })
}

#[cfg(test)]
mod tests {
    use crash_dashboard_crash_models::{DayOfWeek, Month};
    use crash_dashboard_reports_models::{
        HourlyPoint, IntersectionCount, MonthlyPoint, SeasonTotal,
    };

    use super::*;

    fn hourly() -> HourlyDistribution {
        HourlyDistribution {
            points: (0..24)
                .map(|hour| HourlyPoint {
                    hour,
                    crash_count: if hour == 17 { 40 } else { u64::from(hour) },
                })
                .collect(),
        }
    }

    fn trend() -> MonthlyTrend {
        MonthlyTrend {
            months: Month::all()
                .iter()
                .map(|&month| MonthlyPoint {
                    month,
                    crash_count: if month == Month::October { 30 } else { 5 },
                })
                .collect(),
            seasons: Season::all()
                .iter()
                .map(|&season| SeasonTotal {
                    season,
                    crash_count: 10,
                })
                .collect(),
        }
    }

    #[test]
    fn hourly_style_changes_only_the_trace() {
        let line = hourly_chart(&hourly(), HourlyChartStyle::Line);
        let bar = hourly_chart(&hourly(), HourlyChartStyle::Bar);
        let area = hourly_chart(&hourly(), HourlyChartStyle::Area);

        assert_eq!(line.data[0]["mode"], "lines+markers");
        assert_eq!(bar.data[0]["type"], "bar");
        assert_eq!(bar.data[0]["marker"]["colorscale"], "Viridis");
        assert_eq!(area.data[0]["fill"], "tozeroy");
        assert_eq!(line.data[0]["y"], bar.data[0]["y"]);
        assert_eq!(line.layout, bar.layout);
    }

    #[test]
    fn hourly_chart_highlights_rush_hours_and_peak() {
        let figure = hourly_chart(&hourly(), HourlyChartStyle::Line);
        let shapes = figure.layout["shapes"].as_array().unwrap();

        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0]["x0"], 7);
        assert_eq!(shapes[0]["x1"], 9);
        assert_eq!(shapes[0]["fillcolor"], "yellow");
        assert_eq!(shapes[1]["x0"], 16);
        assert_eq!(shapes[1]["x1"], 19);
        assert_eq!(shapes[1]["fillcolor"], "orange");
        assert_eq!(shapes[1]["opacity"], 0.2);

        let annotations = figure.layout["annotations"].as_array().unwrap();
        let texts: Vec<&str> = annotations.iter().filter_map(|a| a["text"].as_str()).collect();
        assert_eq!(texts, ["Morning Rush", "Evening Rush", "Peak: 40 crashes"]);
        assert_eq!(annotations[2]["x"], 17);
    }

    #[test]
    fn top_intersections_chart_is_horizontal_with_largest_on_top() {
        let data = TopIntersections {
            intersections: vec![
                IntersectionCount {
                    street_a: "A".to_string(),
                    street_b: "B".to_string(),
                    crash_count: 9,
                    latitude: None,
                    longitude: None,
                },
                IntersectionCount {
                    street_a: "C".to_string(),
                    street_b: "D".to_string(),
                    crash_count: 4,
                    latitude: None,
                    longitude: None,
                },
            ],
            has_coordinates: false,
        };
        let figure = top_intersections_chart(&data);

        assert_eq!(figure.data[0]["orientation"], "h");
        assert_eq!(figure.data[0]["y"], json!(["A & B", "C & D"]));
        assert_eq!(figure.data[0]["marker"]["colorscale"], "Reds");
        assert_eq!(figure.layout["yaxis"]["categoryorder"], "array");
        assert_eq!(figure.layout["yaxis"]["categoryarray"], json!(["C & D", "A & B"]));
        assert_eq!(figure.layout["height"], 500);
    }

    #[test]
    fn tied_intersections_keep_warehouse_order() {
        let intersection = |a: &str| IntersectionCount {
            street_a: a.to_string(),
            street_b: "Z".to_string(),
            crash_count: 5,
            latitude: None,
            longitude: None,
        };
        let data = TopIntersections {
            intersections: vec![intersection("B"), intersection("A"), intersection("C")],
            has_coordinates: false,
        };
        let figure = top_intersections_chart(&data);

        assert_eq!(
            figure.layout["yaxis"]["categoryarray"],
            json!(["C & Z", "A & Z", "B & Z"])
        );
    }

    #[test]
    fn heatmap_chart_uses_fixed_scale_and_hour_ticks() {
        let mut grid = HeatmapGrid::zeroed();
        grid.counts[DayOfWeek::Sunday.index()][23] = 5;
        let figure = heatmap_chart(&grid);

        assert_eq!(figure.data[0]["colorscale"], "YlOrRd");
        assert_eq!(figure.data[0]["y"][0], "Monday");
        assert_eq!(figure.data[0]["z"][6][23], 5);
        assert_eq!(figure.data[0]["x"].as_array().unwrap().len(), 24);
        assert_eq!(figure.layout["xaxis"]["dtick"], 1);
        assert_eq!(figure.layout["xaxis"]["title"]["text"], "Hour of Day");
        assert_eq!(figure.layout["yaxis"]["title"]["text"], "Day of Week");
    }

    #[test]
    fn monthly_chart_annotates_the_peak_month() {
        let figure = monthly_chart(&trend());
        let annotation = &figure.layout["annotations"][0];
        assert_eq!(annotation["x"], "October");
        assert_eq!(annotation["text"], "Peak: 30 crashes");
        assert_eq!(figure.layout["xaxis"]["categoryarray"][0], "January");
    }

    #[test]
    fn seasonal_pie_keeps_fixed_order_and_colours() {
        let figure = seasonal_chart(&trend());
        assert_eq!(
            figure.data[0]["labels"],
            json!(["Winter", "Spring", "Summer", "Fall"])
        );
        assert_eq!(
            figure.data[0]["marker"]["colors"],
            json!(["#A1C3D1", "#B39EB5", "#FFB6B9", "#F9C784"])
        );
        assert_eq!(figure.data[0]["sort"], false);
    }
}
