//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    summary_cache::{SnapshotVersion, SummaryCache},
    vehicle::VehicleType,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The vehicle types this service center accepts.
    pub allowed_vehicle_types: Vec<VehicleType>,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Bumped whenever the data changes.
    pub snapshot_version: SnapshotVersion,

    /// Dashboard summaries computed for the current snapshot version.
    pub summary_cache: SummaryCache,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        allowed_vehicle_types: Vec<VehicleType>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            allowed_vehicle_types,
            db_connection: Arc::new(Mutex::new(db_connection)),
            snapshot_version: SnapshotVersion::default(),
            summary_cache: SummaryCache::default(),
        })
    }
}
