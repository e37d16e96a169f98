//! Servicebay is a web app for tracking the vehicles a service center looks
//! after, the services it performs and the follow-up calls to owners.
//!
//! The [analytics] module turns a snapshot of vehicles and service records
//! into the dashboard metrics, time series and reports. The rest of the crate
//! is the SQLite data source and the HTTP server that serves HTML pages, JSON
//! and CSV exports.

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

pub mod analytics;
mod app_state;
mod call_record;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod reports;
mod routing;
mod service_record;
mod snapshot;
mod summary_cache;
#[cfg(test)]
mod test_utils;
mod timezone;
mod vehicle;

pub use app_state::AppState;
pub use call_record::{CallRecord, CallRecordForm, upsert_call_record};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use service_record::{NewServiceRecord, Part, ServiceRecord, create_service_record};
pub use timezone::{current_local_date, get_local_offset};
pub use vehicle::{NewVehicle, Vehicle, VehicleStatus, VehicleType, create_vehicle};

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A vehicle with the same ID has already been registered.
    #[error("a vehicle with the ID \"{0}\" already exists")]
    DuplicateVehicleId(String),

    /// The vehicle type is valid but this service center does not service it.
    #[error("{0} vehicles are not serviced here")]
    VehicleTypeNotAllowed(VehicleType),

    /// A string could not be parsed as a vehicle type.
    #[error("\"{0}\" is not a valid vehicle type")]
    InvalidVehicleType(String),

    /// A string could not be parsed as a vehicle status.
    #[error("\"{0}\" is not a valid vehicle status")]
    InvalidVehicleStatus(String),

    /// A service or call record referred to a vehicle that does not exist.
    #[error("there is no vehicle with the ID \"{0}\"")]
    UnknownVehicle(String),

    /// A labor cost, discount or part cost was negative.
    #[error("the {0} cannot be negative")]
    NegativeAmount(String),

    /// A report could not be written as CSV.
    #[error("could not export the report as CSV: {0}")]
    CsvExportError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::CsvExportError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::DuplicateVehicleId(_)
            | Error::VehicleTypeNotAllowed(_)
            | Error::InvalidVehicleType(_)
            | Error::InvalidVehicleStatus(_)
            | Error::UnknownVehicle(_)
            | Error::NegativeAmount(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
