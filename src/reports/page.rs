//! Renders a report as an HTML table with filters and a link to download it as CSV.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    analytics::{
        CustomerRow, Report, ReportKind, ReportSort, RevenueRow, ServiceRow, ServiceStatus,
        TechnicianFilter, TechnicianTotals, TimeWindow, format_long_date, technician_names,
    },
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency, link,
    },
    navigation::NavBar,
    reports::{ReportParams, ReportsQuery, ReportsState, filtered_report},
    snapshot::load_snapshot,
    timezone::current_local_date,
};

const TABLE_STYLE: &str = "w-full text-sm text-left text-gray-500 dark:text-gray-400";
const NUMBER_CELL_STYLE: &str = "px-6 py-4 text-right";

/// Parse the report kind from a query string value, falling back to the revenue report.
fn parse_kind(value: Option<&str>) -> ReportKind {
    match value.map(str::trim) {
        None | Some("") => ReportKind::default(),
        Some(value) => value.parse().unwrap_or_else(|error| {
            tracing::warn!("{error}, showing the {} report", ReportKind::default());
            ReportKind::default()
        }),
    }
}

/// Display a report as a table.
pub async fn get_reports_page(
    State(state): State<ReportsState>,
    Query(query): Query<ReportsQuery>,
) -> Result<Response, Error> {
    let kind = parse_kind(query.kind.as_deref());
    let params = ReportParams::from_query(&query);

    let today = current_local_date(&state.local_timezone)?;
    let snapshot = load_snapshot(&state.db_connection)?;
    let report = filtered_report(&snapshot, kind, &params, today);
    let technicians = technician_names(&snapshot.service_records);

    Ok(reports_view(&report, &params, &technicians).into_response())
}

fn reports_view(report: &Report, params: &ReportParams, technicians: &[String]) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let kind = report.kind();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            (filter_form(kind, params, technicians))

            div class="w-full flex justify-between items-baseline mb-4"
            {
                h2 class="text-xl font-bold" { (kind.title()) " Report" }

                span id="export-link" class="text-sm"
                {
                    (link(&params.export_url(kind), "Download CSV"))
                }
            }

            div class="w-full overflow-x-auto rounded-lg shadow"
            {
                table id="report-table" class=(TABLE_STYLE)
                {
                    @match report {
                        Report::Revenue(rows) => { (revenue_table(rows)) }
                        Report::Services(rows) => { (services_table(rows)) }
                        Report::Technicians(rows) => { (technicians_table(rows)) }
                        Report::Customers(rows) => { (customers_table(rows)) }
                    }
                }
            }
        }
    );

    base(&format!("{} Report", kind.title()), &[], &content)
}

/// Renders the report, window, technician and sort selectors.
fn filter_form(kind: ReportKind, params: &ReportParams, technicians: &[String]) -> Markup {
    let selected_technician = params.technician.as_query_value();

    html!(
        form
            method="get"
            action=(endpoints::REPORTS_VIEW)
            class="w-full grid grid-cols-1 sm:grid-cols-6 gap-4 items-end mb-8"
        {
            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Report" }
                select id="kind" name="kind" class=(FORM_SELECT_STYLE)
                {
                    @for option_kind in ReportKind::ALL {
                        option value=(option_kind.as_str()) selected[option_kind == kind]
                        {
                            (option_kind.title())
                        }
                    }
                }
            }

            div
            {
                label for="window" class=(FORM_LABEL_STYLE) { "Period" }
                select id="window" name="window" class=(FORM_SELECT_STYLE)
                {
                    @for window in TimeWindow::ALL {
                        option value=(window.as_query_value()) selected[window == params.window]
                        {
                            (window.label())
                        }
                    }
                }
            }

            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                input
                    type="month"
                    id="month"
                    name="month"
                    value=[params.month.map(|month| month.as_query_value())]
                    class=(FORM_SELECT_STYLE);
            }

            div
            {
                label for="technician" class=(FORM_LABEL_STYLE) { "Technician" }
                select id="technician" name="technician" class=(FORM_SELECT_STYLE)
                {
                    option
                        value=(TechnicianFilter::ALL_QUERY_VALUE)
                        selected[selected_technician == TechnicianFilter::ALL_QUERY_VALUE]
                    {
                        "All technicians"
                    }

                    @for technician in technicians {
                        option value=(technician) selected[technician == selected_technician]
                        {
                            (technician)
                        }
                    }
                }
            }

            div
            {
                label for="sort" class=(FORM_LABEL_STYLE) { "Sort by" }
                select id="sort" name="sort" class=(FORM_SELECT_STYLE)
                {
                    option
                        value=(ReportSort::Date.as_str())
                        selected[params.sort == ReportSort::Date]
                    {
                        "Newest first"
                    }
                    option
                        value=(ReportSort::Value.as_str())
                        selected[params.sort == ReportSort::Value]
                    {
                        "Highest value first"
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
        }
    )
}

fn table_head(columns: &[&str]) -> Markup {
    html!(
        thead class=(TABLE_HEADER_STYLE)
        {
            tr
            {
                @for column in columns {
                    th scope="col" class=(TABLE_CELL_STYLE) { (column) }
                }
            }
        }
    )
}

fn empty_row(columns: usize) -> Markup {
    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td colspan=(columns) class={(TABLE_CELL_STYLE) " text-center"}
            {
                "No services match these filters"
            }
        }
    )
}

fn revenue_table(rows: &[RevenueRow]) -> Markup {
    let columns = [
        "Date",
        "Customer",
        "Service Type",
        "Technician",
        "Parts",
        "Labor",
        "Discount",
        "Net Total",
    ];

    html!(
        (table_head(&columns))
        tbody
        {
            @for row in rows {
                tr class=(TABLE_ROW_STYLE)
                {
                    td class=(TABLE_CELL_STYLE) { (format_long_date(row.date)) }
                    td class=(TABLE_CELL_STYLE) { (row.customer) }
                    td class=(TABLE_CELL_STYLE) { (row.service_type) }
                    td class=(TABLE_CELL_STYLE) { (row.technician) }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(row.parts)) }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(row.labor)) }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(row.discount)) }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(row.net_total)) }
                }
            }

            @if rows.is_empty() {
                (empty_row(columns.len()))
            }
        }
    )
}

fn status_badge(status: ServiceStatus) -> Markup {
    let colors = match status {
        ServiceStatus::Completed => {
            "bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300"
        }
        ServiceStatus::Pending => {
            "bg-yellow-100 text-yellow-800 dark:bg-yellow-900 dark:text-yellow-300"
        }
    };

    html!(
        span class={(BADGE_STYLE) " " (colors)} { (status.as_str()) }
    )
}

fn services_table(rows: &[ServiceRow]) -> Markup {
    let columns = [
        "Date",
        "Customer",
        "Vehicle",
        "Service Type",
        "Technician",
        "Status",
        "Notes",
    ];

    html!(
        (table_head(&columns))
        tbody
        {
            @for row in rows {
                tr class=(TABLE_ROW_STYLE)
                {
                    td class=(TABLE_CELL_STYLE) { (format_long_date(row.date)) }
                    td class=(TABLE_CELL_STYLE) { (row.customer) }
                    td class=(TABLE_CELL_STYLE) { (row.vehicle) }
                    td class=(TABLE_CELL_STYLE) { (row.service_type) }
                    td class=(TABLE_CELL_STYLE) { (row.technician) }
                    td class=(TABLE_CELL_STYLE) { (status_badge(row.status)) }
                    td class=(TABLE_CELL_STYLE) { (row.notes) }
                }
            }

            @if rows.is_empty() {
                (empty_row(columns.len()))
            }
        }
    )
}

fn technicians_table(rows: &[TechnicianTotals]) -> Markup {
    let columns = [
        "Technician",
        "Services",
        "Parts",
        "Labor",
        "Discount",
        "Net Total",
    ];

    html!(
        (table_head(&columns))
        tbody
        {
            @for row in rows {
                tr class=(TABLE_ROW_STYLE)
                {
                    td class=(TABLE_CELL_STYLE) { (row.name) }
                    td class=(NUMBER_CELL_STYLE) { (row.services) }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(row.parts)) }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(row.labor)) }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(row.discount)) }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(row.net_value)) }
                }
            }

            @if rows.is_empty() {
                (empty_row(columns.len()))
            }
        }
    )
}

fn customers_table(rows: &[CustomerRow]) -> Markup {
    let columns = [
        "Customer",
        "Services",
        "Vehicles",
        "Total Spent",
        "Last Service",
    ];

    html!(
        (table_head(&columns))
        tbody
        {
            @for row in rows {
                tr class=(TABLE_ROW_STYLE)
                {
                    td class=(TABLE_CELL_STYLE) { (row.customer) }
                    td class=(NUMBER_CELL_STYLE) { (row.services) }
                    td class=(NUMBER_CELL_STYLE) { (row.vehicles) }
                    td class=(NUMBER_CELL_STYLE) { (format_currency(row.total_spent)) }
                    td class=(TABLE_CELL_STYLE) { (row.last_service) }
                }
            }

            @if rows.is_empty() {
                (empty_row(columns.len()))
            }
        }
    )
}
