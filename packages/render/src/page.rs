//! Server-rendered dashboard page.
//!
//! The page is one HTML document: a filter form, the four sections and a
//! footer. Figures and the map are embedded as JSON and drawn by Plotly and
//! Leaflet, both loaded from a CDN.

use std::fmt::Write as _;

use crash_dashboard_crash_models::FilterSelection;
use crash_dashboard_reports_models::{FilterOptions, HourlyChartStyle, ReportSection};
use serde::Serialize;

use crate::figure::Figure;
use crate::map::MapSpec;
use crate::table::TableView;
use crate::views::{DashboardView, HeatmapView, HourlyView, MonthlyView, TopIntersectionsView};
use crate::{RenderError, html_escape};

/// Page and header title.
pub const TITLE: &str = "San Jose Crash Data Analysis";
/// Line under the title.
pub const SUBTITLE: &str = "Traffic accident analysis for the City of San Jose";
/// Footer text.
pub const FOOTER: &str = "San Jose Crash Data Analysis - CMPE 255 Assignment";

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Everything the page shows.
pub struct PageContext<'a> {
    /// Selector options.
    pub options: &'a FilterOptions,
    /// Filters currently applied.
    pub selection: &'a FilterSelection,
    /// Hourly chart style currently applied.
    pub chart_style: HourlyChartStyle,
    /// Section views.
    pub view: &'a DashboardView,
}

/// Renders the full dashboard page.
///
/// # Errors
///
/// Returns [`RenderError::Json`] if a figure cannot be serialized.
pub fn render_dashboard_page(ctx: &PageContext<'_>) -> Result<String, RenderError> {
    let mut scripts = String::new();

    let sections = [
        top_intersections_section(&ctx.view.top_intersections, &mut scripts)?,
        hourly_section(&ctx.view.hourly, &mut scripts)?,
        heatmap_section(&ctx.view.heatmap, &mut scripts)?,
        monthly_section(&ctx.view.monthly, &mut scripts)?,
    ]
    .concat();

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="{leaflet_css}">
    <style>{css}</style>
    <script src="{plotly_js}"></script>
    <script src="{leaflet_js}"></script>
</head>
<body>
    <aside class="sidebar">
        {filters}
    </aside>
    <main class="container">
        <header>
            <h1>{title}</h1>
            <p class="meta">{subtitle}</p>
        </header>
        {sections}
        <footer>
            <hr>
            <p>{footer}</p>
        </footer>
    </main>
    <script>{form_js}</script>
    <script>{scripts}</script>
</body>
</html>"#,
        title = TITLE,
        subtitle = SUBTITLE,
        footer = FOOTER,
        leaflet_css = LEAFLET_CSS,
        plotly_js = PLOTLY_JS,
        leaflet_js = LEAFLET_JS,
        css = inline_css(),
        form_js = inline_form_javascript(),
        filters = render_filters(ctx),
    ))
}

fn render_filters(ctx: &PageContext<'_>) -> String {
    let years = if let Some(warning) = &ctx.options.year_warning {
        warning_box(warning)
    } else {
        ctx.options
            .years
            .iter()
            .map(|year| {
                checkbox(
                    "year",
                    &year.to_string(),
                    ctx.selection.selected_years.contains(year),
                )
            })
            .collect()
    };

    let severities = if let Some(warning) = &ctx.options.severity_warning {
        warning_box(warning)
    } else {
        ctx.options
            .severities
            .iter()
            .map(|severity| {
                checkbox(
                    "severity",
                    severity,
                    ctx.selection.selected_severities.contains(severity),
                )
            })
            .collect()
    };

    let styles: String = HourlyChartStyle::all()
        .iter()
        .map(|style| {
            format!(
                r#"<label><input type="radio" name="style" value="{value}"{checked}> {label}</label>"#,
                value = style.as_ref(),
                checked = if *style == ctx.chart_style { " checked" } else { "" },
                label = style.label(),
            )
        })
        .collect();

    format!(
        r#"<h2>Filters</h2>
        <form id="filters" method="get" action="/">
            <fieldset><legend>Select Years</legend>{years}</fieldset>
            <fieldset><legend>Select Severity Categories</legend>{severities}</fieldset>
            <fieldset><legend>Select chart type:</legend>{styles}</fieldset>
            <button type="submit">Apply</button>
        </form>"#
    )
}

fn checkbox(name: &str, value: &str, checked: bool) -> String {
    format!(
        r#"<label><input type="checkbox" data-filter="{name}" value="{value}"{checked}> {value}</label>"#,
        value = html_escape(value),
        checked = if checked { " checked" } else { "" },
    )
}

fn warning_box(message: &str) -> String {
    format!(r#"<div class="warning">{}</div>"#, html_escape(message))
}

fn error_box(message: &str) -> String {
    format!(r#"<div class="error">{}</div>"#, html_escape(message))
}

fn section<T>(
    title: &str,
    section: &ReportSection<T>,
    scripts: &mut String,
    body: impl FnOnce(&T, &mut String) -> Result<String, RenderError>,
) -> Result<String, RenderError> {
    let content = match section {
        ReportSection::Ready { data } => body(data, scripts)?,
        ReportSection::Failed { message } => error_box(message),
    };
    Ok(format!(
        r#"<section>
            <h2>{title}</h2>
            {content}
        </section>"#
    ))
}

fn top_intersections_section(
    view: &ReportSection<TopIntersectionsView>,
    scripts: &mut String,
) -> Result<String, RenderError> {
    section("Top 10 Crash Sites", view, scripts, |view, scripts| {
        let map = match (&view.map, &view.map_warning) {
            (Some(map), _) => {
                push_map(scripts, "intersection-map", map)?;
                r#"<div id="intersection-map" class="map"></div>"#.to_string()
            }
            (None, warning) => warning_box(warning.as_deref().unwrap_or_default()),
        };
        push_plot(scripts, "intersection-chart", &view.chart)?;

        Ok(format!(
            r#"<h3>Top 10 Crash Intersections Map</h3>
            {map}
            <h3>Top 10 Crash Intersections</h3>
            <div id="intersection-chart" class="chart"></div>
            {table}"#,
            table = render_table(&view.table),
        ))
    })
}

fn hourly_section(
    view: &ReportSection<HourlyView>,
    scripts: &mut String,
) -> Result<String, RenderError> {
    section("Crashes by Hour of Day", view, scripts, |view, scripts| {
        push_plot(scripts, "hourly-chart", &view.chart)?;
        Ok(r#"<div id="hourly-chart" class="chart"></div>
            <a id="hourly-export" class="button" href="/api/reports/hourly/export">Download hourly data as CSV</a>"#
            .to_string())
    })
}

fn heatmap_section(
    view: &ReportSection<HeatmapView>,
    scripts: &mut String,
) -> Result<String, RenderError> {
    section("Day-Hour Crash Heatmap", view, scripts, |view, scripts| {
        push_plot(scripts, "heatmap-chart", &view.chart)?;
        let callout = view
            .callout
            .as_deref()
            .map(|c| format!(r#"<div class="info">{}</div>"#, html_escape(c)))
            .unwrap_or_default();
        Ok(format!(
            r#"<div id="heatmap-chart" class="chart"></div>
            {callout}"#
        ))
    })
}

fn monthly_section(
    view: &ReportSection<MonthlyView>,
    scripts: &mut String,
) -> Result<String, RenderError> {
    section("Monthly Crash Trends", view, scripts, |view, scripts| {
        push_plot(scripts, "monthly-chart", &view.trend_chart)?;
        push_plot(scripts, "season-chart", &view.season_chart)?;
        Ok(r#"<div id="monthly-chart" class="chart"></div>
            <h3>Seasonal Analysis</h3>
            <div id="season-chart" class="chart"></div>"#
            .to_string())
    })
}

fn render_table(table: &TableView) -> String {
    let header: String = table
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", html_escape(c)))
        .collect();
    let rows: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|v| {
                    let text = v.as_str().map_or_else(|| v.to_string(), str::to_string);
                    format!("<td>{}</td>", html_escape(&text))
                })
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!(r"<table><thead><tr>{header}</tr></thead><tbody>{rows}</tbody></table>")
}

/// Serializes `value` for a `<script>` block.
fn script_json<T: Serialize>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn push_plot(scripts: &mut String, id: &str, figure: &Figure) -> Result<(), RenderError> {
    let json = script_json(figure)?;
    let _ = writeln!(
        scripts,
        r#"(function () {{ const f = {json}; Plotly.newPlot("{id}", f.data, f.layout, {{ responsive: true }}); }})();"#
    );
    Ok(())
}

fn push_map(scripts: &mut String, id: &str, map: &MapSpec) -> Result<(), RenderError> {
    let json = script_json(map)?;
    let _ = writeln!(
        scripts,
        r#"(function () {{
    const spec = {json};
    const map = L.map("{id}").setView(spec.center, spec.zoom);
    L.tileLayer("{TILE_URL}", {{ attribution: "&copy; OpenStreetMap contributors" }}).addTo(map);
    for (const m of spec.markers) {{
        L.circleMarker([m.latitude, m.longitude], {{
            radius: m.radius, color: m.color, fill: true, fillColor: m.color, fillOpacity: m.fillOpacity
        }}).bindPopup(m.popup, {{ maxWidth: m.popupMaxWidth }}).addTo(map);
    }}
}})();"#
    );
    Ok(())
}

/// Submits one query parameter per checked year or severity. A group with
/// nothing checked sends a single empty value so that it still reaches the
/// server as "no filter".
fn inline_form_javascript() -> &'static str {
    r#"
document.getElementById("filters").addEventListener("submit", function (event) {
    event.preventDefault();
    const params = new URLSearchParams();
    const collect = (filter, key) => {
        if (!document.querySelector('input[data-filter="' + filter + '"]')) {
            return;
        }
        const checked = document.querySelectorAll('input[data-filter="' + filter + '"]:checked');
        if (checked.length === 0) {
            params.append(key, "");
        }
        checked.forEach((input) => params.append(key, input.value));
    };
    collect("year", "years");
    collect("severity", "severities");
    const style = document.querySelector('input[name="style"]:checked');
    if (style) {
        params.set("style", style.value);
    }
    window.location.search = params.toString();
});
const exportLink = document.getElementById("hourly-export");
if (exportLink) {
    exportLink.href += window.location.search;
}
"#
}

fn inline_css() -> &'static str {
    r"
* { box-sizing: border-box; }
body {
    margin: 0;
    display: flex;
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    color: #111827;
}
.sidebar {
    width: 280px;
    min-height: 100vh;
    padding: 1.5rem;
    background: #f3f4f6;
}
.sidebar fieldset { border: none; padding: 0; margin-bottom: 1rem; }
.sidebar label { display: block; }
.container { flex: 1; max-width: 1200px; padding: 2rem; }
header .meta { color: #6b7280; }
section { margin-bottom: 3rem; }
.chart { width: 100%; min-height: 450px; }
.map { width: 100%; height: 500px; }
table { border-collapse: collapse; margin-top: 1rem; }
th, td { padding: 0.4rem 0.8rem; border-bottom: 1px solid #e5e7eb; text-align: left; }
.error, .warning, .info { padding: 0.75rem 1rem; border-radius: 4px; margin: 0.5rem 0; }
.error { background: #fee2e2; color: #991b1b; }
.warning { background: #fef3c7; color: #92400e; }
.info { background: #dbeafe; color: #1e40af; }
.button { display: inline-block; margin-top: 0.5rem; }
footer { color: #6b7280; }
"
}
