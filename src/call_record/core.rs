use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, vehicle::VehicleId};

/// Whether a vehicle's owner has been called about their next service.
///
/// There is at most one call record per vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub vehicle_id: VehicleId,
    pub called: bool,
    /// The date of the call, only set while `called` is true.
    pub call_date: Option<Date>,
    pub notes: Option<String>,
}

/// The request body for updating a vehicle's call record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecordForm {
    pub called: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn create_call_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS call_record (
            vehicle_id TEXT PRIMARY KEY,
            called INTEGER NOT NULL,
            call_date TEXT,
            notes TEXT,
            FOREIGN KEY(vehicle_id) REFERENCES vehicle(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<CallRecord, rusqlite::Error> {
    Ok(CallRecord {
        vehicle_id: row.get(0)?,
        called: row.get(1)?,
        call_date: row.get(2)?,
        notes: row.get(3)?,
    })
}

/// Insert or update the call record for a vehicle.
///
/// The call date is set to `today` when `called` is true and cleared otherwise.
///
/// # Errors
/// Returns [Error::UnknownVehicle] if the vehicle does not exist.
pub fn upsert_call_record(
    vehicle_id: &str,
    form: CallRecordForm,
    today: Date,
    connection: &Connection,
) -> Result<CallRecord, Error> {
    let call_record = CallRecord {
        vehicle_id: vehicle_id.to_owned(),
        called: form.called,
        call_date: form.called.then_some(today),
        notes: form.notes.filter(|notes| !notes.trim().is_empty()),
    };

    connection
        .execute(
            "INSERT INTO call_record (vehicle_id, called, call_date, notes)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(vehicle_id) DO UPDATE SET
                called = excluded.called,
                call_date = excluded.call_date,
                notes = excluded.notes",
            params![
                call_record.vehicle_id,
                call_record.called,
                call_record.call_date,
                call_record.notes,
            ],
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::UnknownVehicle(vehicle_id.to_owned())
            }
            error => error.into(),
        })?;

    Ok(call_record)
}

/// Retrieve all call records ordered by vehicle ID.
pub fn get_call_records(connection: &Connection) -> Result<Vec<CallRecord>, Error> {
    connection
        .prepare(
            "SELECT vehicle_id, called, call_date, notes FROM call_record ORDER BY vehicle_id ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}
