//! Database operations for service records.

use std::collections::HashMap;

use rusqlite::{Connection, params};
use time::Date;
use uuid::Uuid;

use crate::{
    Error,
    service_record::core::{
        NewServiceRecord, Part, SERVICE_RECORD_COLUMNS, ServiceRecord, map_row_to_service_record,
    },
    vehicle::{get_vehicle, update_vehicle_service_history},
};

/// Record a new service and update the serviced vehicle's history.
///
/// The record, its parts and the vehicle update are written in a single
/// database transaction.
///
/// # Errors
/// Returns:
/// - [Error::NegativeAmount] if the labor cost, discount or a part cost is negative,
/// - [Error::UnknownVehicle] if the vehicle does not exist,
/// - [Error::SqlError] for other SQL errors.
pub fn create_service_record(
    new_record: NewServiceRecord,
    today: Date,
    connection: &Connection,
) -> Result<ServiceRecord, Error> {
    validate_amounts(&new_record)?;

    let transaction = connection.unchecked_transaction()?;

    let mut vehicle =
        get_vehicle(&new_record.vehicle_id, &transaction).map_err(|error| match error {
            Error::NotFound => Error::UnknownVehicle(new_record.vehicle_id.clone()),
            error => error,
        })?;

    let record = ServiceRecord {
        id: Uuid::new_v4().to_string(),
        vehicle_id: new_record.vehicle_id.clone(),
        date: new_record.date,
        service_type: new_record.service_type.trim().to_owned(),
        parts: new_record.parts.clone(),
        labor_cost: new_record.labor_cost,
        discount: new_record.discount,
        technician: new_record.technician.clone(),
        notes: new_record.notes.clone(),
        has_coupon: new_record.has_coupon,
        coupon_type: new_record.coupon_type.clone(),
        kilometers: new_record.kilometers,
    };

    transaction.execute(
        &format!(
            "INSERT INTO service_record ({SERVICE_RECORD_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            record.id,
            record.vehicle_id,
            record.date,
            record.service_type,
            record.labor_cost,
            record.discount,
            record.technician,
            record.notes,
            record.has_coupon,
            record.coupon_type,
            record.kilometers,
        ],
    )?;

    {
        let mut insert_part = transaction.prepare(
            "INSERT INTO service_part (service_record_id, position, name, cost)
            VALUES (?1, ?2, ?3, ?4)",
        )?;

        for (position, part) in record.parts.iter().enumerate() {
            insert_part.execute(params![record.id, position as i64, part.name, part.cost])?;
        }
    }

    vehicle.apply_service_visit(&new_record.visit(), today);
    update_vehicle_service_history(&vehicle, &transaction)?;

    transaction.commit()?;

    tracing::debug!(
        "Recorded service {} for vehicle {}",
        record.id,
        record.vehicle_id
    );

    Ok(record)
}

fn validate_amounts(new_record: &NewServiceRecord) -> Result<(), Error> {
    if new_record.labor_cost < 0.0 {
        return Err(Error::NegativeAmount("labor_cost".to_owned()));
    }

    if new_record.discount < 0.0 {
        return Err(Error::NegativeAmount("discount".to_owned()));
    }

    if let Some(part) = new_record.parts.iter().find(|part| part.cost < 0.0) {
        return Err(Error::NegativeAmount(format!("part \"{}\"", part.name)));
    }

    Ok(())
}

/// Retrieve service records, newest first, with their parts in order.
///
/// Records on the same date are ordered from most to least recently
/// inserted, so the order is stable between calls.
///
/// If `vehicle_id` is given, only the records for that vehicle are returned.
pub fn get_service_records(
    vehicle_id: Option<&str>,
    connection: &Connection,
) -> Result<Vec<ServiceRecord>, Error> {
    let mut records = connection
        .prepare(&format!(
            "SELECT {SERVICE_RECORD_COLUMNS} FROM service_record
            WHERE ?1 IS NULL OR vehicle_id = ?1
            ORDER BY date DESC, rowid DESC;"
        ))?
        .query_map([vehicle_id], map_row_to_service_record)?
        .collect::<Result<Vec<ServiceRecord>, rusqlite::Error>>()?;

    let mut parts_by_record = get_parts_by_record(vehicle_id, connection)?;

    for record in &mut records {
        if let Some(parts) = parts_by_record.remove(&record.id) {
            record.parts = parts;
        }
    }

    Ok(records)
}

fn get_parts_by_record(
    vehicle_id: Option<&str>,
    connection: &Connection,
) -> Result<HashMap<String, Vec<Part>>, Error> {
    let mut stmt = connection.prepare(
        "SELECT p.service_record_id, p.name, p.cost
        FROM service_part p
        INNER JOIN service_record r ON r.id = p.service_record_id
        WHERE ?1 IS NULL OR r.vehicle_id = ?1
        ORDER BY p.service_record_id, p.position ASC;",
    )?;

    let rows = stmt.query_map([vehicle_id], |row| {
        let record_id: String = row.get(0)?;
        let part = Part {
            name: row.get(1)?,
            cost: row.get(2)?,
        };

        Ok((record_id, part))
    })?;

    let mut parts_by_record: HashMap<String, Vec<Part>> = HashMap::new();

    for row in rows {
        let (record_id, part) = row?;
        parts_by_record.entry(record_id).or_default().push(part);
    }

    Ok(parts_by_record)
}
