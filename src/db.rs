//! Database initialization for the application's SQLite data source.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, call_record::create_call_record_table, service_record::create_service_record_tables,
    vehicle::create_vehicle_table,
};

/// Enable foreign keys and create the tables for the domain models.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign key enforcement cannot be changed inside a transaction.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_vehicle_table(&transaction)?;
    create_service_record_tables(&transaction)?;
    create_call_record_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
