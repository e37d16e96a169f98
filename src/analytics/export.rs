//! CSV export of reports.

use csv::Writer;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, analytics::reports::Report};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

fn iso_date(date: Date) -> Result<String, Error> {
    date.format(ISO_DATE)
        .map_err(|error| Error::CsvExportError(error.to_string()))
}

/// Write `report` as CSV with a header row.
///
/// Dates are written as ISO 8601 and money with two decimal places.
///
/// # Errors
/// Returns [Error::CsvExportError] if a row could not be written.
pub fn report_to_csv(report: &Report) -> Result<Vec<u8>, Error> {
    let mut writer = Writer::from_writer(Vec::new());

    match report {
        Report::Revenue(rows) => {
            writer.write_record([
                "Date",
                "Customer",
                "Service Type",
                "Technician",
                "Parts",
                "Labor",
                "Discount",
                "Net Total",
            ])?;

            for row in rows {
                writer.write_record([
                    iso_date(row.date)?,
                    row.customer.clone(),
                    row.service_type.clone(),
                    row.technician.clone(),
                    money(row.parts),
                    money(row.labor),
                    money(row.discount),
                    money(row.net_total),
                ])?;
            }
        }
        Report::Services(rows) => {
            writer.write_record([
                "Date",
                "Customer",
                "Vehicle",
                "Service Type",
                "Technician",
                "Status",
                "Notes",
            ])?;

            for row in rows {
                writer.write_record([
                    iso_date(row.date)?,
                    row.customer.clone(),
                    row.vehicle.clone(),
                    row.service_type.clone(),
                    row.technician.clone(),
                    row.status.as_str().to_owned(),
                    row.notes.clone(),
                ])?;
            }
        }
        Report::Technicians(rows) => {
            writer.write_record([
                "Technician",
                "Services",
                "Parts",
                "Labor",
                "Discount",
                "Net Total",
            ])?;

            for row in rows {
                writer.write_record([
                    row.name.clone(),
                    row.services.to_string(),
                    money(row.parts),
                    money(row.labor),
                    money(row.discount),
                    money(row.net_value),
                ])?;
            }
        }
        Report::Customers(rows) => {
            writer.write_record([
                "Customer",
                "Services",
                "Vehicles",
                "Total Spent",
                "Last Service",
            ])?;

            for row in rows {
                writer.write_record([
                    row.customer.clone(),
                    row.services.to_string(),
                    row.vehicles.to_string(),
                    money(row.total_spent),
                    row.last_service.clone(),
                ])?;
            }
        }
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvExportError(error.to_string()))
}
