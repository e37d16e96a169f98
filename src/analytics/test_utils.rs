//! Builders for engine test fixtures.

use time::{Date, macros::date};

use crate::{
    service_record::{Part, ServiceRecord},
    vehicle::{Vehicle, VehicleStatus, VehicleType},
};

/// A service record with no parts, no costs and no technician.
pub(crate) fn record(id: &str, vehicle_id: &str, date: Date) -> ServiceRecord {
    ServiceRecord {
        id: id.to_owned(),
        vehicle_id: vehicle_id.to_owned(),
        date,
        service_type: "General Service".to_owned(),
        parts: Vec::new(),
        labor_cost: 0.0,
        discount: 0.0,
        technician: None,
        notes: None,
        has_coupon: false,
        coupon_type: None,
        kilometers: 0,
    }
}

/// A service record worth `net_value` in labor, performed by `technician`.
pub(crate) fn priced_record(
    id: &str,
    vehicle_id: &str,
    date: Date,
    net_value: f64,
    technician: Option<&str>,
) -> ServiceRecord {
    ServiceRecord {
        labor_cost: net_value,
        technician: technician.map(str::to_owned),
        ..record(id, vehicle_id, date)
    }
}

pub(crate) fn part(name: &str, cost: f64) -> Part {
    Part {
        name: name.to_owned(),
        cost,
    }
}

pub(crate) fn vehicle(id: &str, owner: &str) -> Vehicle {
    Vehicle {
        id: id.to_owned(),
        vehicle_type: VehicleType::Car,
        make: "Toyota".to_owned(),
        model: "Hilux".to_owned(),
        year: 2017,
        engine_capacity: Some(2800.0),
        owner: owner.to_owned(),
        phone: "021 555 0100".to_owned(),
        last_service: date!(2024 - 01 - 01),
        next_service: date!(2024 - 07 - 01),
        last_service_kilometers: 0,
        current_kilometers: 0,
        status: VehicleStatus::Active,
    }
}
