//! Per-section view bundles served by the JSON API and embedded in the
//! HTML page.

use crash_dashboard_reports_models::{
    Dashboard, HeatmapGrid, HourlyChartStyle, HourlyDistribution, HourlyPoint, MonthlyTrend,
    ReportSection, SeasonTotal, TopIntersections,
};
use serde::{Deserialize, Serialize};

use crate::figure::{self, Figure};
use crate::map::{self, MAP_UNAVAILABLE, MapSpec};
use crate::table::{self, TableView};

/// Map, chart and table for the top intersections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopIntersectionsView {
    /// Marker map, absent when there were no coordinates.
    pub map: Option<MapSpec>,
    /// Shown in place of the map when it is absent.
    pub map_warning: Option<String>,
    /// Ranked bar chart.
    pub chart: Figure,
    /// Raw table.
    pub table: TableView,
}

/// Chart and table for the hourly distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyView {
    /// Style the chart was drawn in.
    pub style: HourlyChartStyle,
    /// Hourly chart.
    pub chart: Figure,
    /// 24-row table.
    pub table: TableView,
    /// Busiest hour.
    pub peak: Option<HourlyPoint>,
}

/// Heatmap and its peak callout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapView {
    /// Day-by-hour heatmap.
    pub chart: Figure,
    /// `Peak: {day} at {hour}:00 ({n} crashes)`.
    pub callout: Option<String>,
}

/// Monthly trend and seasonal pie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyView {
    /// Monthly line chart.
    pub trend_chart: Figure,
    /// Seasonal pie chart.
    pub season_chart: Figure,
    /// Seasonal totals behind the pie.
    pub seasons: Vec<SeasonTotal>,
}

/// Every section of one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Top intersections.
    pub top_intersections: ReportSection<TopIntersectionsView>,
    /// Hourly distribution.
    pub hourly: ReportSection<HourlyView>,
    /// Day x hour heatmap.
    pub heatmap: ReportSection<HeatmapView>,
    /// Monthly and seasonal trends.
    pub monthly: ReportSection<MonthlyView>,
}

/// Builds the top-intersections views.
#[must_use]
pub fn top_intersections_view(data: &TopIntersections) -> TopIntersectionsView {
    let map = map::intersection_map(data);
    let map_warning = map.is_none().then(|| {
        log::warn!("{MAP_UNAVAILABLE}");
        MAP_UNAVAILABLE.to_string()
    });

    TopIntersectionsView {
        map,
        map_warning,
        chart: figure::top_intersections_chart(data),
        table: table::intersections_table(data),
    }
}

/// Builds the hourly views.
#[must_use]
pub fn hourly_view(data: &HourlyDistribution, style: HourlyChartStyle) -> HourlyView {
    HourlyView {
        style,
        chart: figure::hourly_chart(data, style),
        table: table::hourly_table(data),
        peak: data.peak(),
    }
}

/// Builds the heatmap views.
#[must_use]
pub fn heatmap_view(grid: &HeatmapGrid) -> HeatmapView {
    HeatmapView {
        chart: figure::heatmap_chart(grid),
        callout: grid.peak().map(|p| p.callout()),
    }
}

/// Builds the monthly views.
#[must_use]
pub fn monthly_view(trend: &MonthlyTrend) -> MonthlyView {
    MonthlyView {
        trend_chart: figure::monthly_chart(trend),
        season_chart: figure::seasonal_chart(trend),
        seasons: trend.seasons.clone(),
    }
}

/// Builds the views for every section, keeping failed sections failed.
#[must_use]
pub fn dashboard_view(dashboard: &Dashboard) -> DashboardView {
    DashboardView {
        top_intersections: dashboard.top_intersections.as_ref().map(top_intersections_view),
        hourly: dashboard
            .hourly
            .as_ref()
            .map(|data| hourly_view(data, dashboard.chart_style)),
        heatmap: dashboard.heatmap.as_ref().map(heatmap_view),
        monthly: dashboard.monthly.as_ref().map(monthly_view),
    }
}
