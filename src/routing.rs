//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    call_record::{get_call_records_endpoint, upsert_call_record_endpoint},
    dashboard::{get_dashboard_page, get_dashboard_summary_endpoint},
    endpoints,
    not_found::get_404_not_found,
    reports::{export_report_endpoint, get_reports_page},
    service_record::{create_service_record_endpoint, get_service_records_endpoint},
    vehicle::{create_vehicle_endpoint, get_vehicles_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page));

    let api_routes = Router::new()
        .route(endpoints::DASHBOARD_API, get(get_dashboard_summary_endpoint))
        .route(endpoints::REPORT_EXPORT, get(export_report_endpoint))
        .route(
            endpoints::VEHICLES_API,
            get(get_vehicles_endpoint).post(create_vehicle_endpoint),
        )
        .route(
            endpoints::SERVICE_RECORDS_API,
            get(get_service_records_endpoint).post(create_service_record_endpoint),
        )
        .route(endpoints::CALLS_API, get(get_call_records_endpoint))
        .route(endpoints::CALL_API, put(upsert_call_record_endpoint));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
