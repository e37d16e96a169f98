//! Download a report as a CSV file.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    analytics::{ReportKind, report_to_csv},
    reports::{ReportParams, ReportsQuery, ReportsState, filtered_report},
    snapshot::load_snapshot,
    timezone::current_local_date,
};

/// A route handler that responds with the report named in the path as a CSV attachment.
///
/// An unknown report name results in a 404 response.
pub async fn export_report_endpoint(
    State(state): State<ReportsState>,
    Path(kind): Path<String>,
    Query(query): Query<ReportsQuery>,
) -> Result<Response, Error> {
    let kind: ReportKind = kind.parse().map_err(|error| {
        tracing::debug!("could not export report: {error}");
        Error::NotFound
    })?;
    let params = ReportParams::from_query(&query);

    let today = current_local_date(&state.local_timezone)?;
    let snapshot = load_snapshot(&state.db_connection)?;
    let report = filtered_report(&snapshot, kind, &params, today);
    let csv = report_to_csv(&report)?;

    let content_disposition = format!("attachment; filename=\"{kind}-report-{today}.csv\"");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, content_disposition),
        ],
        csv,
    )
        .into_response())
}
