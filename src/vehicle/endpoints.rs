//! Defines the endpoints for listing and registering vehicles.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    summary_cache::SnapshotVersion,
    timezone::current_local_date,
    vehicle::{
        NewVehicle, VehicleType,
        db::{create_vehicle, get_all_vehicles},
    },
};

/// The state needed to list or register vehicles.
#[derive(Debug, Clone)]
pub struct VehicleState {
    /// The database connection for managing vehicles.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The vehicle types that may be registered.
    pub allowed_vehicle_types: Vec<VehicleType>,
    pub snapshot_version: SnapshotVersion,
}

impl FromRef<AppState> for VehicleState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            allowed_vehicle_types: state.allowed_vehicle_types.clone(),
            snapshot_version: state.snapshot_version.clone(),
        }
    }
}

/// A route handler that returns all vehicles as JSON.
pub async fn get_vehicles_endpoint(State(state): State<VehicleState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let vehicles = get_all_vehicles(&connection)
        .inspect_err(|error| tracing::error!("could not get vehicles: {error}"))?;

    Ok(Json(vehicles).into_response())
}

/// A route handler for registering a new vehicle, responds with the created vehicle.
pub async fn create_vehicle_endpoint(
    State(state): State<VehicleState>,
    Json(new_vehicle): Json<NewVehicle>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let vehicle = create_vehicle(
        new_vehicle,
        &state.allowed_vehicle_types,
        today,
        &connection,
    )
    .inspect_err(|error| tracing::warn!("could not register vehicle: {error}"))?;

    let version = state.snapshot_version.bump();
    tracing::info!("Registered vehicle {} (snapshot version {version})", vehicle.id);

    Ok((StatusCode::CREATED, Json(vehicle)).into_response())
}
