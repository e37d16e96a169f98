//! Core service record domain types.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::vehicle::{ServiceVisit, VehicleId};

/// Identifier for a service record.
pub type ServiceRecordId = String;

/// A part used during a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    pub cost: f64,
}

/// A service performed on a vehicle.
///
/// Service records are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub id: ServiceRecordId,
    pub vehicle_id: VehicleId,
    pub date: Date,
    pub service_type: String,
    pub parts: Vec<Part>,
    pub labor_cost: f64,
    pub discount: f64,
    pub technician: Option<String>,
    pub notes: Option<String>,
    pub has_coupon: bool,
    pub coupon_type: Option<String>,
    /// The odometer reading at the time of the service.
    pub kilometers: u32,
}

impl ServiceRecord {
    /// The sum of the cost of all parts.
    pub fn parts_total(&self) -> f64 {
        self.parts.iter().map(|part| part.cost).sum()
    }

    /// Labor plus parts minus the discount.
    ///
    /// The result is negative when the discount exceeds the cost, it is not clamped.
    pub fn net_value(&self) -> f64 {
        self.labor_cost + self.parts_total() - self.discount
    }

    /// The technician's name, treating blank names as unassigned.
    pub fn technician_name(&self) -> Option<&str> {
        self.technician
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// The data needed to record a new service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServiceRecord {
    pub vehicle_id: VehicleId,
    pub date: Date,
    pub service_type: String,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub labor_cost: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub technician: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub has_coupon: bool,
    #[serde(default)]
    pub coupon_type: Option<String>,
    #[serde(default)]
    pub kilometers: u32,
    /// When the vehicle should next be serviced, if it should change.
    #[serde(default)]
    pub next_service: Option<Date>,
}

impl NewServiceRecord {
    /// The parts of the record that update the serviced vehicle.
    pub fn visit(&self) -> ServiceVisit {
        ServiceVisit {
            date: self.date,
            kilometers: self.kilometers,
            next_service: self.next_service,
        }
    }
}

/// Create the tables for service records and their parts.
pub fn create_service_record_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS service_record (
            id TEXT PRIMARY KEY,
            vehicle_id TEXT NOT NULL,
            date TEXT NOT NULL,
            service_type TEXT NOT NULL,
            labor_cost REAL NOT NULL,
            discount REAL NOT NULL,
            technician TEXT,
            notes TEXT,
            has_coupon INTEGER NOT NULL,
            coupon_type TEXT,
            kilometers INTEGER NOT NULL,
            FOREIGN KEY(vehicle_id) REFERENCES vehicle(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_service_record_date ON service_record(date);
        CREATE INDEX IF NOT EXISTS idx_service_record_vehicle ON service_record(vehicle_id);

        CREATE TABLE IF NOT EXISTS service_part (
            id INTEGER PRIMARY KEY,
            service_record_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            cost REAL NOT NULL,
            FOREIGN KEY(service_record_id) REFERENCES service_record(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_service_part_record ON service_part(service_record_id);",
    )?;

    Ok(())
}

/// The column list that [map_row_to_service_record] expects, in order.
pub(crate) const SERVICE_RECORD_COLUMNS: &str = "id, vehicle_id, date, service_type, labor_cost, \
    discount, technician, notes, has_coupon, coupon_type, kilometers";

/// Map a row to a service record without its parts.
pub fn map_row_to_service_record(row: &Row) -> Result<ServiceRecord, rusqlite::Error> {
    Ok(ServiceRecord {
        id: row.get(0)?,
        vehicle_id: row.get(1)?,
        date: row.get(2)?,
        service_type: row.get(3)?,
        parts: Vec::new(),
        labor_cost: row.get(4)?,
        discount: row.get(5)?,
        technician: row.get(6)?,
        notes: row.get(7)?,
        has_coupon: row.get(8)?,
        coupon_type: row.get(9)?,
        kilometers: row.get(10)?,
    })
}
