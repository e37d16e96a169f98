//! The reports page and CSV export of the revenue, services, technicians and customers reports.

mod export;
mod page;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    AppState,
    analytics::{
        Report, ReportKind, ReportSort, TechnicianFilter, TimeWindow, build_report,
        filter_by_month, filter_by_technician, filter_by_window,
    },
    endpoints::{self, format_endpoint},
    snapshot::{Snapshot, parse_window},
};

pub use export::export_report_endpoint;
pub use page::get_reports_page;

/// The state needed for building reports.
#[derive(Debug, Clone)]
pub struct ReportsState {
    /// The database connection for reading vehicles and service records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The report filters, e.g. `?kind=services&window=90d&technician=Bob&sort=value`.
///
/// `kind` is only read by the reports page, the export endpoint takes it from the path.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReportsQuery {
    /// One of "revenue", "services", "technicians" or "customers".
    pub kind: Option<String>,
    /// One of "7d", "30d", "90d", "1y" or "all".
    pub window: Option<String>,
    /// A technician's name or "all".
    pub technician: Option<String>,
    /// "date" or "value".
    pub sort: Option<String>,
    /// A calendar month such as "2024-05", used instead of `window` when set.
    pub month: Option<String>,
}

/// A calendar month picked on the reports page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReportMonth {
    year: i32,
    month: Month,
}

impl ReportMonth {
    /// The month in the "YYYY-MM" form used by month inputs.
    fn as_query_value(self) -> String {
        format!("{:04}-{:02}", self.year, u8::from(self.month))
    }
}

/// The parsed report filters.
#[derive(Debug, Clone, PartialEq)]
struct ReportParams {
    window: TimeWindow,
    technician: TechnicianFilter,
    sort: ReportSort,
    month: Option<ReportMonth>,
}

impl ReportParams {
    fn from_query(query: &ReportsQuery) -> Self {
        Self {
            window: parse_window(query.window.as_deref()),
            technician: TechnicianFilter::from_query(query.technician.as_deref()),
            sort: parse_sort(query.sort.as_deref()),
            month: parse_month(query.month.as_deref()),
        }
    }

    /// The URL for downloading the report of `kind` with these filters as CSV.
    fn export_url(&self, kind: ReportKind) -> String {
        let path = format_endpoint(endpoints::REPORT_EXPORT, kind.as_str());
        let month = self.month.map(ReportMonth::as_query_value);
        let mut params = vec![
            ("window", self.window.as_query_value()),
            ("technician", self.technician.as_query_value()),
            ("sort", self.sort.as_str()),
        ];
        if let Some(month) = &month {
            params.push(("month", month.as_str()));
        }

        match serde_urlencoded::to_string(&params) {
            Ok(query) => format!("{path}?{query}"),
            Err(error) => {
                tracing::error!("Could not encode report filters {params:?}: {error}");
                path
            }
        }
    }
}

/// Parse the sort order from a query string value, falling back to newest first.
fn parse_sort(value: Option<&str>) -> ReportSort {
    match value.map(str::trim) {
        None | Some("") => ReportSort::default(),
        Some(value) => value.parse().unwrap_or_else(|error| {
            tracing::warn!("{error}, sorting by {}", ReportSort::default().as_str());
            ReportSort::default()
        }),
    }
}

/// Parse a "YYYY-MM" month, ignoring values that are not a valid month.
fn parse_month(value: Option<&str>) -> Option<ReportMonth> {
    let value = value.map(str::trim).filter(|value| !value.is_empty())?;

    let parsed = value.split_once('-').and_then(|(year, month)| {
        let year = year.parse::<i32>().ok()?;
        let month = month.parse::<u8>().ok().and_then(|month| Month::try_from(month).ok())?;

        Some(ReportMonth { year, month })
    });

    if parsed.is_none() {
        tracing::warn!("unknown report month \"{value}\", using the time window instead");
    }

    parsed
}

/// Assemble the report of `kind` from `snapshot` for the filters in `params`.
///
/// The technician filter is applied first, then the month if one was picked,
/// otherwise the time window.
fn filtered_report(
    snapshot: &Snapshot,
    kind: ReportKind,
    params: &ReportParams,
    today: Date,
) -> Report {
    let records = filter_by_technician(&snapshot.service_records, &params.technician);
    let records = match params.month {
        Some(ReportMonth { year, month }) => filter_by_month(&records, year, month),
        None => filter_by_window(&records, params.window, today),
    };

    tracing::debug!(
        "building {kind} report from {} of {} service records",
        records.len(),
        snapshot.service_records.len()
    );

    build_report(kind, &records, &snapshot.vehicles, params.sort)
}
