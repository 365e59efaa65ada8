//! HTTP handler functions for the crash dashboard.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use crash_dashboard_crash_models::FilterSelection;
use crash_dashboard_query::WhereFragment;
use crash_dashboard_render::export::{HOURLY_CSV_FILENAME, hourly_csv};
use crash_dashboard_render::page::{PageContext, render_dashboard_page};
use crash_dashboard_render::views;
use crash_dashboard_reports::{
    build_dashboard, heatmap, hourly, load_filter_options, monthly, top_intersections,
};
use crash_dashboard_reports_models::{FilterOptions, ReportSection};
use crash_dashboard_server_models::{ApiCacheCleared, ApiError, ApiHealth, ReportQueryParams};
use serde::Serialize;

use crate::AppState;

/// Loads the selector options and resolves the requested filters against
/// them: an absent parameter selects every available option.
fn resolve_selection(
    state: &AppState,
    params: &ReportQueryParams,
) -> (FilterOptions, FilterSelection) {
    let options = load_filter_options(state.executor.as_ref(), &state.table);
    let selection = FilterSelection::resolve(
        params.requested_years(),
        params.requested_severities(),
        &options.years,
        &options.severities,
    );
    (options, selection)
}

fn filter_for(state: &AppState, params: &ReportQueryParams) -> WhereFragment {
    let (_, selection) = resolve_selection(state, params);
    WhereFragment::from_selection(&selection)
}

fn internal_error(message: String) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiError { error: message })
}

/// Runs synchronous warehouse work on the blocking pool.
async fn blocking<T, F>(state: web::Data<AppState>, work: F) -> Result<T, HttpResponse>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> T + Send + 'static,
{
    web::block(move || work(&state)).await.map_err(|e| {
        log::error!("Blocking task failed: {e}");
        internal_error(e.to_string())
    })
}

/// Runs `work` on the blocking pool and answers with its JSON.
async fn json_section<T, F>(state: web::Data<AppState>, work: F) -> HttpResponse
where
    T: Serialize + Send + 'static,
    F: FnOnce(&AppState) -> T + Send + 'static,
{
    match blocking(state, work).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(response) => response,
    }
}

/// `GET /`
///
/// Renders the full dashboard page for the requested filters.
pub async fn dashboard_page(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> HttpResponse {
    let params = ReportQueryParams::from_query(req.query_string());
    let page = blocking(state, move |state| {
        let (options, selection) = resolve_selection(state, &params);
        let chart_style = params.chart_style();
        let dashboard = build_dashboard(
            state.executor.as_ref(),
            &state.table,
            &selection,
            chart_style,
        );
        let view = views::dashboard_view(&dashboard);

        render_dashboard_page(&PageContext {
            options: &options,
            selection: &selection,
            chart_style,
            view: &view,
        })
    })
    .await;

    match page {
        Ok(Ok(html)) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Ok(Err(e)) => {
            log::error!("Failed to render dashboard page: {e}");
            internal_error(e.to_string())
        }
        Err(response) => response,
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/filters`
///
/// Returns the distinct years and severity categories, with a warning for
/// each list that could not be loaded.
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    json_section(state, |state| {
        load_filter_options(state.executor.as_ref(), &state.table)
    })
    .await
}

/// `GET /api/reports/top-intersections`
pub async fn top_intersections_report(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> HttpResponse {
    let params = ReportQueryParams::from_query(req.query_string());
    json_section(state, move |state| {
        let filter = filter_for(state, &params);
        top_intersections::run(state.executor.as_ref(), &state.table, &filter)
            .as_ref()
            .map(views::top_intersections_view)
    })
    .await
}

/// `GET /api/reports/hourly`
pub async fn hourly_report(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> HttpResponse {
    let params = ReportQueryParams::from_query(req.query_string());
    json_section(state, move |state| {
        let filter = filter_for(state, &params);
        let style = params.chart_style();
        hourly::run(state.executor.as_ref(), &state.table, &filter)
            .as_ref()
            .map(|data| views::hourly_view(data, style))
    })
    .await
}

/// `GET /api/reports/hourly/export`
///
/// Downloads the 24-row hourly table as `hourly_crash_data.csv`. Answers
/// 503 when the hourly data could not be loaded.
pub async fn hourly_export(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> HttpResponse {
    let params = ReportQueryParams::from_query(req.query_string());
    let section = match blocking(state, move |state| {
        let filter = filter_for(state, &params);
        hourly::run(state.executor.as_ref(), &state.table, &filter)
    })
    .await
    {
        Ok(section) => section,
        Err(response) => return response,
    };

    match section {
        ReportSection::Ready { data } => match hourly_csv(&data) {
            Ok(csv) => HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{HOURLY_CSV_FILENAME}\""),
                ))
                .body(csv),
            Err(e) => {
                log::error!("Failed to write hourly CSV: {e}");
                internal_error(e.to_string())
            }
        },
        ReportSection::Failed { message } => {
            HttpResponse::ServiceUnavailable().json(ApiError { error: message })
        }
    }
}

/// `GET /api/reports/heatmap`
pub async fn heatmap_report(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> HttpResponse {
    let params = ReportQueryParams::from_query(req.query_string());
    json_section(state, move |state| {
        let filter = filter_for(state, &params);
        heatmap::run(state.executor.as_ref(), &state.table, &filter)
            .as_ref()
            .map(views::heatmap_view)
    })
    .await
}

/// `GET /api/reports/monthly`
pub async fn monthly_report(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> HttpResponse {
    let params = ReportQueryParams::from_query(req.query_string());
    json_section(state, move |state| {
        let filter = filter_for(state, &params);
        monthly::run(state.executor.as_ref(), &state.table, &filter)
            .as_ref()
            .map(views::monthly_view)
    })
    .await
}

/// `GET /api/cache`
pub async fn cache_stats(state: web::Data<AppState>) -> HttpResponse {
    state.executor.cache_stats().map_or_else(
        || {
            HttpResponse::NotFound().json(ApiError {
                error: "Result cache is disabled".to_string(),
            })
        },
        |stats| HttpResponse::Ok().json(stats),
    )
}

/// `DELETE /api/cache`
pub async fn clear_cache(state: web::Data<AppState>) -> HttpResponse {
    let cleared = state.executor.cache_stats().map_or(0, |stats| stats.entries);
    state.executor.clear_cache();
    HttpResponse::Ok().json(ApiCacheCleared { cleared })
}
