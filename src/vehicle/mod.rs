mod core;
mod db;
mod endpoints;

pub use core::{
    NewVehicle, ServiceVisit, Vehicle, VehicleId, VehicleStatus, VehicleType, create_vehicle_table,
};
pub use db::{create_vehicle, get_all_vehicles, get_vehicle, update_vehicle_service_history};
pub use endpoints::{create_vehicle_endpoint, get_vehicles_endpoint};
