//! Plain-text dashboard summary for the terminal.

use std::fmt::Write as _;

use crash_dashboard_crash_models::FilterSelection;
use crash_dashboard_reports_models::{
    Dashboard, HeatmapGrid, HourlyDistribution, MonthlyTrend, ReportSection, TopIntersections,
};

use crate::page::TITLE;

/// Width of the longest bar in the hourly histogram.
const BAR_WIDTH: u64 = 40;

/// Renders every section of `dashboard` as text.
#[must_use]
pub fn render_text_summary(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{}", "=".repeat(TITLE.len()));
    let _ = writeln!(out, "{}", describe_selection(&dashboard.selection));

    write_section(&mut out, "Top 10 Crash Sites", &dashboard.top_intersections, write_top);
    write_section(&mut out, "Crashes by Hour of Day", &dashboard.hourly, write_hourly);
    write_section(&mut out, "Day-Hour Crash Heatmap", &dashboard.heatmap, write_heatmap);
    write_section(&mut out, "Monthly Crash Trends", &dashboard.monthly, write_monthly);
    out
}

fn describe_selection(selection: &FilterSelection) -> String {
    let years = if selection.selected_years.is_empty() {
        "all".to_string()
    } else {
        selection
            .selected_years
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let severities = if selection.selected_severities.is_empty() {
        "all".to_string()
    } else {
        selection
            .selected_severities
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("Years: {years}\nSeverities: {severities}")
}

fn write_section<T>(
    out: &mut String,
    title: &str,
    section: &ReportSection<T>,
    body: fn(&mut String, &T),
) {
    let _ = writeln!(out, "\n{title}\n{}", "-".repeat(title.len()));
    match section {
        ReportSection::Ready { data } => body(out, data),
        ReportSection::Failed { message } => {
            let _ = writeln!(out, "ERROR: {message}");
        }
    }
}

fn write_top(out: &mut String, data: &TopIntersections) {
    for (rank, i) in data.intersections.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {:<50} {:>6}", rank + 1, i.label(), i.crash_count);
    }
}

fn write_hourly(out: &mut String, data: &HourlyDistribution) {
    let max = data.peak().map_or(0, |p| p.crash_count).max(1);
    for p in &data.points {
        let width = usize::try_from(p.crash_count * BAR_WIDTH / max).unwrap_or(0);
        let _ = writeln!(out, "{:02}:00 {:>6} {}", p.hour, p.crash_count, "#".repeat(width));
    }
    if let Some(peak) = data.peak() {
        let _ = writeln!(
            out,
            "Peak: {} crashes at {:02}:00",
            peak.crash_count, peak.hour
        );
    }
}

fn write_heatmap(out: &mut String, grid: &HeatmapGrid) {
    if let Some(peak) = grid.peak() {
        let _ = writeln!(out, "{}", peak.callout());
    }
    for (day, row) in grid.days.iter().zip(&grid.counts) {
        let total: u64 = row.iter().sum();
        let _ = writeln!(out, "{:<10} {total:>6}", day.as_ref());
    }
}

#[allow(clippy::cast_precision_loss)]
fn write_monthly(out: &mut String, trend: &MonthlyTrend) {
    for p in &trend.months {
        let _ = writeln!(out, "{:<10} {:>6}", p.month.as_ref(), p.crash_count);
    }
    if let Some(peak) = trend.peak() {
        let _ = writeln!(out, "Peak: {} crashes in {}", peak.crash_count, peak.month);
    }

    let total = trend.total();
    let _ = writeln!(out, "\nSeasonal Analysis");
    for s in &trend.seasons {
        let share = if total == 0 {
            0.0
        } else {
            s.crash_count as f64 * 100.0 / total as f64
        };
        let _ = writeln!(
            out,
            "{:<10} {:>6} ({share:.1}%)",
            s.season.as_ref(),
            s.crash_count
        );
    }
}

#[cfg(test)]
mod tests {
    use crash_dashboard_reports_models::{HourlyChartStyle, HourlyPoint};

    use super::*;

    #[test]
    fn summary_lists_each_section_and_inline_errors() {
        let dashboard = Dashboard {
            selection: FilterSelection::new([2021], []),
            chart_style: HourlyChartStyle::Line,
            top_intersections: ReportSection::failed("Could not load intersection data."),
            hourly: ReportSection::ready(HourlyDistribution {
                points: (0..24)
                    .map(|hour| HourlyPoint {
                        hour,
                        crash_count: if hour == 17 { 80 } else { 10 },
                    })
                    .collect(),
            }),
            heatmap: ReportSection::failed("Could not load day-hour heatmap data."),
            monthly: ReportSection::failed("Could not load monthly crash data."),
        };
        let text = render_text_summary(&dashboard);

        assert!(text.starts_with("San Jose Crash Data Analysis\n"));
        assert!(text.contains("Years: 2021\nSeverities: all"));
        assert!(text.contains("ERROR: Could not load intersection data."));
        assert!(text.contains(&format!("17:00     80 {}", "#".repeat(40))));
        assert!(text.contains("Peak: 80 crashes at 17:00"));
        assert!(text.contains("ERROR: Could not load monthly crash data."));
    }
}
