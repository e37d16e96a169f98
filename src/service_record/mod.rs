mod core;
mod db;
mod endpoints;

pub use core::{NewServiceRecord, Part, ServiceRecord, create_service_record_tables};
pub use db::{create_service_record, get_service_records};
pub use endpoints::{create_service_record_endpoint, get_service_records_endpoint};
