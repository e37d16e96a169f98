//! Database operations for vehicles.

use rusqlite::{Connection, params};
use time::Date;

use crate::{
    Error,
    vehicle::core::{NewVehicle, VEHICLE_COLUMNS, Vehicle, VehicleType, map_row_to_vehicle},
};

/// Register a new vehicle.
///
/// The vehicle's status is derived from its next service date and `today`.
///
/// # Errors
/// Returns:
/// - [Error::VehicleTypeNotAllowed] if the vehicle type is not in `allowed_types`,
/// - [Error::DuplicateVehicleId] if a vehicle with the same ID already exists,
/// - [Error::SqlError] for other SQL errors.
pub fn create_vehicle(
    new_vehicle: NewVehicle,
    allowed_types: &[VehicleType],
    today: Date,
    connection: &Connection,
) -> Result<Vehicle, Error> {
    if !allowed_types.contains(&new_vehicle.vehicle_type) {
        return Err(Error::VehicleTypeNotAllowed(new_vehicle.vehicle_type));
    }

    let vehicle = new_vehicle.into_vehicle(today);

    connection
        .execute(
            &format!(
                "INSERT INTO vehicle ({VEHICLE_COLUMNS})
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            ),
            params![
                vehicle.id,
                vehicle.vehicle_type,
                vehicle.make,
                vehicle.model,
                vehicle.year,
                vehicle.engine_capacity,
                vehicle.owner,
                vehicle.phone,
                vehicle.last_service,
                vehicle.next_service,
                vehicle.last_service_kilometers,
                vehicle.current_kilometers,
                vehicle.status,
            ],
        )
        .map_err(|error| match error {
            // Code 1555 occurs when a PRIMARY KEY constraint failed, 2067 for UNIQUE.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 1555 || sql_error.extended_code == 2067 =>
            {
                Error::DuplicateVehicleId(vehicle.id.clone())
            }
            error => error.into(),
        })?;

    Ok(vehicle)
}

/// Retrieve a single vehicle by ID.
pub fn get_vehicle(vehicle_id: &str, connection: &Connection) -> Result<Vehicle, Error> {
    connection
        .prepare(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicle WHERE id = :id;"
        ))?
        .query_row(&[(":id", &vehicle_id)], map_row_to_vehicle)
        .map_err(|error| error.into())
}

/// Retrieve all vehicles ordered by ID.
pub fn get_all_vehicles(connection: &Connection) -> Result<Vec<Vehicle>, Error> {
    connection
        .prepare(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicle ORDER BY id ASC;"
        ))?
        .query_map([], map_row_to_vehicle)?
        .map(|maybe_vehicle| maybe_vehicle.map_err(|error| error.into()))
        .collect()
}

/// Save the service history fields and status of an existing vehicle.
pub fn update_vehicle_service_history(
    vehicle: &Vehicle,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE vehicle SET
            last_service = ?1,
            next_service = ?2,
            last_service_kilometers = ?3,
            current_kilometers = ?4,
            status = ?5
        WHERE id = ?6",
        params![
            vehicle.last_service,
            vehicle.next_service,
            vehicle.last_service_kilometers,
            vehicle.current_kilometers,
            vehicle.status,
            vehicle.id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UnknownVehicle(vehicle.id.clone()));
    }

    Ok(())
}
