//! Core vehicle domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::Error;

/// Identifier for a vehicle. The VIN is used as the identifier.
pub type VehicleId = String;

/// Number of days ahead of today in which a scheduled service counts as upcoming.
pub const UPCOMING_SERVICE_DAYS: i64 = 30;

/// The kinds of vehicles a service center can work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Bike,
    Car,
}

impl VehicleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bike => "bike",
            Self::Car => "car",
        }
    }
}

impl FromStr for VehicleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bike" => Ok(Self::Bike),
            "car" => Ok(Self::Car),
            other => Err(Error::InvalidVehicleType(other.to_owned())),
        }
    }
}

impl Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for VehicleType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for VehicleType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Where a vehicle stands relative to its next scheduled service.
///
/// The status is derived when the vehicle is written to the database, it is
/// not re-derived as time passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    /// The next service is more than [UPCOMING_SERVICE_DAYS] days away.
    Active,
    /// The next service is due within [UPCOMING_SERVICE_DAYS] days.
    Upcoming,
    /// The next service date has passed.
    Overdue,
}

impl VehicleStatus {
    /// Derive the status of a vehicle from its next service date.
    pub fn derive(next_service: Date, today: Date) -> Self {
        if next_service < today {
            Self::Overdue
        } else if next_service <= today + Duration::days(UPCOMING_SERVICE_DAYS) {
            Self::Upcoming
        } else {
            Self::Active
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Upcoming => "upcoming",
            Self::Overdue => "overdue",
        }
    }
}

impl FromStr for VehicleStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "upcoming" => Ok(Self::Upcoming),
            "overdue" => Ok(Self::Overdue),
            other => Err(Error::InvalidVehicleStatus(other.to_owned())),
        }
    }
}

impl ToSql for VehicleStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for VehicleStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A vehicle registered with the service center.
///
/// There is no separate customer entity, `owner` doubles as the customer's
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub vehicle_type: VehicleType,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub engine_capacity: Option<f64>,
    pub owner: String,
    pub phone: String,
    pub last_service: Date,
    pub next_service: Date,
    pub last_service_kilometers: u32,
    pub current_kilometers: u32,
    pub status: VehicleStatus,
}

impl Vehicle {
    /// The make and model, e.g. "Honda CB500X".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.make.trim(), self.model.trim())
            .trim()
            .to_owned()
    }

    /// Update the service history of the vehicle after a new service visit.
    ///
    /// The last service date only moves forward, so back-dated service
    /// records do not rewind it. The odometer reading never decreases.
    pub fn apply_service_visit(&mut self, visit: &ServiceVisit, today: Date) {
        if visit.date >= self.last_service {
            self.last_service = visit.date;
            self.last_service_kilometers = visit.kilometers;
        }

        self.current_kilometers = self.current_kilometers.max(visit.kilometers);

        if let Some(next_service) = visit.next_service {
            self.next_service = next_service;
        }

        self.status = VehicleStatus::derive(self.next_service, today);
    }
}

/// The parts of a service record that change the vehicle's history.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceVisit {
    pub date: Date,
    pub kilometers: u32,
    pub next_service: Option<Date>,
}

/// The data needed to register a new vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVehicle {
    pub id: VehicleId,
    pub vehicle_type: VehicleType,
    pub make: String,
    pub model: String,
    pub year: u16,
    #[serde(default)]
    pub engine_capacity: Option<f64>,
    pub owner: String,
    pub phone: String,
    pub last_service: Date,
    pub next_service: Date,
    #[serde(default)]
    pub last_service_kilometers: u32,
    #[serde(default)]
    pub current_kilometers: u32,
}

impl NewVehicle {
    /// Create the vehicle, deriving its status relative to `today`.
    pub fn into_vehicle(self, today: Date) -> Vehicle {
        Vehicle {
            status: VehicleStatus::derive(self.next_service, today),
            id: self.id,
            vehicle_type: self.vehicle_type,
            make: self.make,
            model: self.model,
            year: self.year,
            engine_capacity: self.engine_capacity,
            owner: self.owner,
            phone: self.phone,
            last_service: self.last_service,
            next_service: self.next_service,
            last_service_kilometers: self.last_service_kilometers,
            current_kilometers: self.current_kilometers,
        }
    }
}

pub fn create_vehicle_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS vehicle (
            id TEXT PRIMARY KEY,
            vehicle_type TEXT NOT NULL,
            make TEXT NOT NULL,
            model TEXT NOT NULL,
            year INTEGER NOT NULL,
            engine_capacity REAL,
            owner TEXT NOT NULL,
            phone TEXT NOT NULL,
            last_service TEXT NOT NULL,
            next_service TEXT NOT NULL,
            last_service_kilometers INTEGER NOT NULL,
            current_kilometers INTEGER NOT NULL,
            status TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_vehicle_owner ON vehicle(owner);",
    )?;

    Ok(())
}

/// The column list that [map_row_to_vehicle] expects, in order.
pub(crate) const VEHICLE_COLUMNS: &str = "id, vehicle_type, make, model, year, engine_capacity, \
    owner, phone, last_service, next_service, last_service_kilometers, current_kilometers, status";

pub fn map_row_to_vehicle(row: &Row) -> Result<Vehicle, rusqlite::Error> {
    Ok(Vehicle {
        id: row.get(0)?,
        vehicle_type: row.get(1)?,
        make: row.get(2)?,
        model: row.get(3)?,
        year: row.get(4)?,
        engine_capacity: row.get(5)?,
        owner: row.get(6)?,
        phone: row.get(7)?,
        last_service: row.get(8)?,
        next_service: row.get(9)?,
        last_service_kilometers: row.get(10)?,
        current_kilometers: row.get(11)?,
        status: row.get(12)?,
    })
}


#[cfg(test)]
mod vehicle_tests {
    use time::macros::date;

    use super::{ServiceVisit, Vehicle, VehicleStatus, VehicleType};

    fn test_vehicle() -> Vehicle {
        Vehicle {
            id: "VIN1".to_owned(),
            vehicle_type: VehicleType::Bike,
            make: "Honda".to_owned(),
            model: "CB500X".to_owned(),
            year: 2021,
            engine_capacity: Some(471.0),
            owner: "Alice".to_owned(),
            phone: "021 555 0101".to_owned(),
            last_service: date!(2024 - 01 - 10),
            next_service: date!(2024 - 04 - 10),
            last_service_kilometers: 8_000,
            current_kilometers: 9_500,
            status: VehicleStatus::Overdue,
        }
    }

    #[test]
    fn display_name_joins_make_and_model() {
        assert_eq!(test_vehicle().display_name(), "Honda CB500X");
    }

    #[test]
    fn display_name_handles_missing_model() {
        let vehicle = Vehicle {
            model: String::new(),
            ..test_vehicle()
        };

        assert_eq!(vehicle.display_name(), "Honda");
    }

    #[test]
    fn service_visit_updates_history_and_status() {
        let mut vehicle = test_vehicle();

        vehicle.apply_service_visit(
            &ServiceVisit {
                date: date!(2024 - 05 - 01),
                kilometers: 10_000,
                next_service: Some(date!(2024 - 08 - 01)),
            },
            date!(2024 - 05 - 01),
        );

        assert_eq!(vehicle.last_service, date!(2024 - 05 - 01));
        assert_eq!(vehicle.last_service_kilometers, 10_000);
        assert_eq!(vehicle.current_kilometers, 10_000);
        assert_eq!(vehicle.next_service, date!(2024 - 08 - 01));
        assert_eq!(vehicle.status, VehicleStatus::Active);
    }

    #[test]
    fn back_dated_visit_does_not_rewind_history() {
        let mut vehicle = test_vehicle();

        vehicle.apply_service_visit(
            &ServiceVisit {
                date: date!(2023 - 12 - 01),
                kilometers: 7_000,
                next_service: None,
            },
            date!(2024 - 05 - 01),
        );

        assert_eq!(vehicle.last_service, date!(2024 - 01 - 10));
        assert_eq!(vehicle.last_service_kilometers, 8_000);
        assert_eq!(vehicle.current_kilometers, 9_500);
        assert_eq!(vehicle.next_service, date!(2024 - 04 - 10));
        assert_eq!(vehicle.status, VehicleStatus::Overdue);
    }
}
