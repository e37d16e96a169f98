//! Defines the endpoints for follow-up call records.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    call_record::{CallRecordForm, get_call_records, upsert_call_record},
    summary_cache::SnapshotVersion,
    timezone::current_local_date,
};

/// The state needed to list or update call records.
#[derive(Debug, Clone)]
pub struct CallRecordState {
    /// The database connection for managing call records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub snapshot_version: SnapshotVersion,
}

impl FromRef<AppState> for CallRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            snapshot_version: state.snapshot_version.clone(),
        }
    }
}

/// A route handler that returns all call records as JSON.
pub async fn get_call_records_endpoint(
    State(state): State<CallRecordState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let call_records = get_call_records(&connection)
        .inspect_err(|error| tracing::error!("could not get call records: {error}"))?;

    Ok(Json(call_records).into_response())
}

/// A route handler that records whether a vehicle's owner has been called.
pub async fn upsert_call_record_endpoint(
    State(state): State<CallRecordState>,
    Path(vehicle_id): Path<String>,
    Json(form): Json<CallRecordForm>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let call_record = upsert_call_record(&vehicle_id, form, today, &connection)
        .inspect_err(|error| tracing::warn!("could not update call record: {error}"))?;

    state.snapshot_version.bump();
    tracing::info!(
        "Vehicle {vehicle_id} marked as {}",
        if call_record.called { "called" } else { "not called" }
    );

    Ok(Json(call_record).into_response())
}
