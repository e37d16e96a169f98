//! Defines the endpoints for listing and creating service records.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    service_record::{
        NewServiceRecord,
        db::{create_service_record, get_service_records},
    },
    summary_cache::SnapshotVersion,
    timezone::current_local_date,
};

/// The state needed to list or create service records.
#[derive(Debug, Clone)]
pub struct ServiceRecordState {
    /// The database connection for managing service records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub snapshot_version: SnapshotVersion,
}

impl FromRef<AppState> for ServiceRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            snapshot_version: state.snapshot_version.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceRecordQuery {
    /// Only list the records for this vehicle.
    pub vehicle_id: Option<String>,
}

/// A route handler that returns service records as JSON, newest first.
pub async fn get_service_records_endpoint(
    State(state): State<ServiceRecordState>,
    Query(query): Query<ServiceRecordQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let vehicle_id = query
        .vehicle_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let records = get_service_records(vehicle_id, &connection)
        .inspect_err(|error| tracing::error!("could not get service records: {error}"))?;

    Ok(Json(records).into_response())
}

/// A route handler for recording a service, responds with the created record.
///
/// The serviced vehicle's history and status are updated in the same database transaction.
pub async fn create_service_record_endpoint(
    State(state): State<ServiceRecordState>,
    Json(new_record): Json<NewServiceRecord>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let record = create_service_record(new_record, today, &connection)
        .inspect_err(|error| tracing::warn!("could not create service record: {error}"))?;

    let version = state.snapshot_version.bump();
    tracing::info!(
        "Created service record {} for vehicle {} (snapshot version {version})",
        record.id,
        record.vehicle_id
    );

    Ok((StatusCode::CREATED, Json(record)).into_response())
}
