//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for the dashboard page and the dashboard summary API
//! - HTML view functions for rendering the dashboard UI
//! - State and query types used by the handlers

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    analytics::{DashboardSummary, TechnicianFilter, TimeWindow},
    dashboard::{
        cards::{fleet_cards_view, metric_cards_view},
        charts::{
            DashboardChart, ECHARTS_SCRIPT_URL, charts_script, charts_view, daily_services_chart,
            monthly_revenue_chart, service_types_chart, technician_earnings_chart,
        },
        tables::{service_types_table, technician_table},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    snapshot::{load_snapshot, parse_window},
    summary_cache::{SnapshotVersion, SummaryCache, SummaryKey},
    timezone::current_local_date,
};

/// The state needed for displaying the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading vehicles and service records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub snapshot_version: SnapshotVersion,
    pub summary_cache: SummaryCache,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            snapshot_version: state.snapshot_version.clone(),
            summary_cache: state.summary_cache.clone(),
        }
    }
}

/// The dashboard filters, e.g. `?window=90d&technician=Bob`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// One of "7d", "30d", "90d", "1y" or "all".
    pub window: Option<String>,
    /// A technician's name or "all".
    pub technician: Option<String>,
}

/// Get the dashboard summary for the query, computing it on a cache miss.
fn get_summary(
    state: &DashboardState,
    query: &DashboardQuery,
) -> Result<Arc<DashboardSummary>, Error> {
    let today = current_local_date(&state.local_timezone)?;
    let window = parse_window(query.window.as_deref());
    let technician = TechnicianFilter::from_query(query.technician.as_deref());

    // Read before loading so a concurrent write can never leave older data under a newer version.
    let version = state.snapshot_version.current();
    let key = SummaryKey {
        version,
        window,
        technician: technician.clone(),
        today,
    };

    state.summary_cache.get_or_try_compute(key, || {
        let snapshot = load_snapshot(&state.db_connection)?;
        tracing::debug!(
            "computing dashboard summary for window {window}, technician {} (version {version})",
            technician.as_query_value()
        );

        Ok(DashboardSummary::compute(
            &snapshot.vehicles,
            &snapshot.service_records,
            &snapshot.call_records,
            window,
            &technician,
            today,
        ))
    })
}

/// Display a page with the service center's metrics and charts.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let summary = get_summary(&state, &query)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    // Service records cannot exist without a vehicle.
    if summary.fleet.total == 0 {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    Ok(dashboard_view(nav_bar, &summary).into_response())
}

/// A route handler that returns the dashboard summary as JSON.
pub async fn get_dashboard_summary_endpoint(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let summary = get_summary(&state, &query)?;

    Ok(Json(summary.as_ref()).into_response())
}

/// Creates the dashboard charts from the summary.
fn build_dashboard_charts(summary: &DashboardSummary) -> [DashboardChart; 4] {
    [
        DashboardChart {
            id: "monthly-revenue-chart",
            options: monthly_revenue_chart(&summary.monthly_revenue).to_string(),
        },
        DashboardChart {
            id: "daily-services-chart",
            options: daily_services_chart(&summary.daily_services).to_string(),
        },
        DashboardChart {
            id: "service-types-chart",
            options: service_types_chart(&summary.service_types, summary.window).to_string(),
        },
        DashboardChart {
            id: "technician-earnings-chart",
            options: technician_earnings_chart(&summary.technician_earnings, summary.window)
                .to_string(),
        },
    ]
}

/// Renders the dashboard page when no vehicles or services exist.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once vehicles and services have been
                added through the API at "
                code { (endpoints::VEHICLES_API) }
                " and "
                code { (endpoints::SERVICE_RECORDS_API) }
                "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the window and technician selectors.
fn filter_form(summary: &DashboardSummary) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="w-full grid grid-cols-1 sm:grid-cols-3 gap-4 items-end mb-8"
        {
            div
            {
                label for="window" class=(FORM_LABEL_STYLE) { "Period" }
                select id="window" name="window" class=(FORM_SELECT_STYLE)
                {
                    @for window in TimeWindow::ALL {
                        option
                            value=(window.as_query_value())
                            selected[window == summary.window]
                        {
                            (window.label())
                        }
                    }
                }
            }

            div
            {
                label for="technician" class=(FORM_LABEL_STYLE) { "Technician" }
                select id="technician" name="technician" class=(FORM_SELECT_STYLE)
                {
                    option
                        value=(TechnicianFilter::ALL_QUERY_VALUE)
                        selected[summary.technician == TechnicianFilter::ALL_QUERY_VALUE]
                    {
                        "All technicians"
                    }

                    @for technician in &summary.technicians {
                        option
                            value=(technician)
                            selected[*technician == summary.technician]
                        {
                            (technician)
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
        }
    )
}

/// Renders the main dashboard page with cards, charts and tables.
fn dashboard_view(nav_bar: NavBar, summary: &DashboardSummary) -> Markup {
    let nav_bar = nav_bar.into_html();
    let charts = build_dashboard_charts(summary);

    let content = html!(
        (nav_bar)

        div id="dashboard-content" class=(PAGE_CONTAINER_STYLE)
        {
            (filter_form(summary))
            (metric_cards_view(&summary.metrics, summary.window))
            (charts_view(&charts))

            section id="tables" class="w-full mx-auto mb-8"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (service_types_table(&summary.service_types))
                    (technician_table(&summary.technician_earnings))
                }
            }

            (fleet_cards_view(&summary.fleet, &summary.follow_ups))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use std::sync::{Arc, Mutex};
    use time::{Duration, OffsetDateTime};

    use crate::{
        db::initialize,
        service_record::{NewServiceRecord, Part, create_service_record},
        summary_cache::{SnapshotVersion, SummaryCache},
        test_utils::{
            assert_element_exists, assert_status_ok, assert_valid_html, parse_html_document,
            read_json,
        },
        vehicle::{NewVehicle, VehicleType, create_vehicle},
    };

    use super::{
        DashboardQuery, DashboardState, get_dashboard_page, get_dashboard_summary_endpoint,
        get_summary,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn get_test_state(conn: Connection) -> DashboardState {
        DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
            snapshot_version: SnapshotVersion::default(),
            summary_cache: SummaryCache::default(),
        }
    }

    fn add_test_data(conn: &Connection) {
        let today = OffsetDateTime::now_utc().date();

        for (id, owner) in [("V1", "Alice"), ("V2", "Dan")] {
            create_vehicle(
                NewVehicle {
                    id: id.to_owned(),
                    vehicle_type: VehicleType::Car,
                    make: "Toyota".to_owned(),
                    model: "Hilux".to_owned(),
                    year: 2017,
                    engine_capacity: Some(2800.0),
                    owner: owner.to_owned(),
                    phone: "021 555 0123".to_owned(),
                    last_service: today - Duration::days(200),
                    next_service: today - Duration::days(10),
                    last_service_kilometers: 100_000,
                    current_kilometers: 110_000,
                },
                &[VehicleType::Car],
                today,
                conn,
            )
            .unwrap();
        }

        for (vehicle_id, technician, labor_cost) in
            [("V1", "Bob", 100.0), ("V2", "Carol", 40.0), ("V1", "Bob", 60.0)]
        {
            create_service_record(
                NewServiceRecord {
                    vehicle_id: vehicle_id.to_owned(),
                    date: today,
                    service_type: "Oil Change".to_owned(),
                    parts: vec![Part {
                        name: "Oil filter".to_owned(),
                        cost: 20.0,
                    }],
                    labor_cost,
                    discount: 0.0,
                    technician: Some(technician.to_owned()),
                    notes: None,
                    has_coupon: false,
                    coupon_type: None,
                    kilometers: 0,
                    next_service: None,
                },
                today,
                conn,
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let conn = get_test_connection();
        add_test_data(&conn);
        let state = get_test_state(conn);

        let response = get_dashboard_page(State(state), Query(DashboardQuery::default()))
            .await
            .unwrap();

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_chart_exists(&html, "monthly-revenue-chart");
        assert_chart_exists(&html, "daily-services-chart");
        assert_chart_exists(&html, "service-types-chart");
        assert_chart_exists(&html, "technician-earnings-chart");
        assert_element_exists(&html, "#service-types-table");
        assert_element_exists(&html, "#technicians-table");
        assert_element_exists(&html, "#fleet");
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_data() {
        let state = get_test_state(get_test_connection());

        let response = get_dashboard_page(State(state), Query(DashboardQuery::default()))
            .await
            .unwrap();
        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        let heading = html
            .select(&Selector::parse("h2").unwrap())
            .next()
            .expect("no-data heading not found");
        assert_eq!(heading.text().collect::<String>(), "Nothing here yet...");
        assert!(
            html.select(&Selector::parse("#charts").unwrap())
                .next()
                .is_none()
        );
    }

    #[tokio::test]
    async fn technician_selector_lists_all_technicians() {
        let conn = get_test_connection();
        add_test_data(&conn);
        let state = get_test_state(conn);
        let query = DashboardQuery {
            window: Some("7d".to_owned()),
            technician: Some("Carol".to_owned()),
        };

        let response = get_dashboard_page(State(state), Query(query)).await.unwrap();

        let html = parse_html_document(response).await;
        let options: Vec<String> = html
            .select(&Selector::parse("#technician option").unwrap())
            .map(|option| option.value().attr("value").unwrap().to_owned())
            .collect();
        assert_eq!(options, ["all", "Bob", "Carol"]);

        let selected = html
            .select(&Selector::parse("#technician option[selected]").unwrap())
            .next()
            .unwrap();
        assert_eq!(selected.value().attr("value"), Some("Carol"));
        let selected_window = html
            .select(&Selector::parse("#window option[selected]").unwrap())
            .next()
            .unwrap();
        assert_eq!(selected_window.value().attr("value"), Some("7d"));
    }

    #[tokio::test]
    async fn summary_endpoint_returns_metrics() {
        let conn = get_test_connection();
        add_test_data(&conn);
        let state = get_test_state(conn);

        let response =
            get_dashboard_summary_endpoint(State(state), Query(DashboardQuery::default()))
                .await
                .unwrap();

        assert_status_ok(&response);
        let summary: serde_json::Value = read_json(response).await;
        assert_eq!(summary["window"], "30d");
        assert_eq!(summary["technician"], "all");
        assert_eq!(summary["metrics"]["total_services"], 3);
        assert_eq!(summary["metrics"]["total_revenue"], 260.0);
        assert_eq!(summary["metrics"]["repeat_business_rate"], 50.0);
        assert_eq!(summary["metrics"]["top_performer"]["name"], "Bob");
        assert_eq!(summary["fleet"]["overdue"], 2);
        assert_eq!(summary["follow_ups"]["overdue"], 2);
        assert_eq!(summary["monthly_revenue"].as_array().unwrap().len(), 6);
        assert_eq!(summary["daily_services"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn summary_is_served_from_cache_until_data_changes() {
        let conn = get_test_connection();
        add_test_data(&conn);
        let state = get_test_state(conn);

        let first = get_summary(&state, &DashboardQuery::default()).unwrap();
        let second = get_summary(&state, &DashboardQuery::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        state.snapshot_version.bump();
        let third = get_summary(&state, &DashboardQuery::default()).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        assert_element_exists(html, &format!("#{chart_id}"));
    }
}
