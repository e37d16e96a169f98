//! Loads a consistent copy of the data for the analytics pages.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    analytics::TimeWindow,
    call_record::{CallRecord, get_call_records},
    service_record::{ServiceRecord, get_service_records},
    vehicle::{Vehicle, get_all_vehicles},
};

/// Everything the analytics engine reads, as of one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub vehicles: Vec<Vehicle>,
    /// Ordered newest first.
    pub service_records: Vec<ServiceRecord>,
    pub call_records: Vec<CallRecord>,
}

/// Read all vehicles, service records and call records.
///
/// The database lock is held only while reading, the caller can run the
/// aggregation after it has been released.
pub fn load_snapshot(db_connection: &Arc<Mutex<Connection>>) -> Result<Snapshot, Error> {
    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let vehicles = get_all_vehicles(&connection)
        .inspect_err(|error| tracing::error!("could not get vehicles: {error}"))?;
    let service_records = get_service_records(None, &connection)
        .inspect_err(|error| tracing::error!("could not get service records: {error}"))?;
    let call_records = get_call_records(&connection)
        .inspect_err(|error| tracing::error!("could not get call records: {error}"))?;

    Ok(Snapshot {
        vehicles,
        service_records,
        call_records,
    })
}

/// Parse the `window` query parameter, falling back to the default window.
pub fn parse_window(value: Option<&str>) -> TimeWindow {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => TimeWindow::default(),
        Some(value) => value.parse().unwrap_or_else(|error| {
            tracing::warn!("{error}, using the default window");
            TimeWindow::default()
        }),
    }
}
