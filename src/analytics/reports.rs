//! Tabular reports for display and export.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    analytics::grouping::{TechnicianTotals, by_customer, by_technician, index_vehicles},
    service_record::ServiceRecord,
    vehicle::Vehicle,
};

/// Shown when a record's vehicle cannot be found.
pub const UNKNOWN_LABEL: &str = "Unknown";
/// Shown when a record has no technician.
pub const UNASSIGNED_LABEL: &str = "Unassigned";
/// Shown when a record has no notes.
pub const NO_NOTES_LABEL: &str = "No notes";

/// The available reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Revenue,
    Services,
    Technicians,
    Customers,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Revenue,
        ReportKind::Services,
        ReportKind::Technicians,
        ReportKind::Customers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Services => "services",
            Self::Technicians => "technicians",
            Self::Customers => "customers",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Services => "Services",
            Self::Technicians => "Technicians",
            Self::Customers => "Customers",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown report \"{s}\""))
    }
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The order of rows in the per-record reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSort {
    /// Newest first.
    #[default]
    Date,
    /// Highest net value first.
    Value,
}

impl ReportSort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Value => "value",
        }
    }
}

impl FromStr for ReportSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "value" => Ok(Self::Value),
            other => Err(format!("unknown sort order \"{other}\"")),
        }
    }
}

/// One service record in the revenue report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRow {
    pub date: Date,
    pub customer: String,
    pub service_type: String,
    pub technician: String,
    pub parts: f64,
    pub labor: f64,
    pub discount: f64,
    pub net_total: f64,
}

/// One service record in the services report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRow {
    pub date: Date,
    pub customer: String,
    pub vehicle: String,
    pub service_type: String,
    pub technician: String,
    pub status: ServiceStatus,
    pub notes: String,
}

/// Whether a service has been completed, judged by whether an odometer reading was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceStatus {
    Completed,
    Pending,
}

impl ServiceStatus {
    pub fn of(record: &ServiceRecord) -> Self {
        if record.kilometers > 0 {
            Self::Completed
        } else {
            Self::Pending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Pending => "Pending",
        }
    }
}

/// One owner in the customers report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRow {
    pub customer: String,
    pub services: usize,
    pub vehicles: usize,
    pub total_spent: f64,
    /// The date of the most recent service, e.g. "1 May 2024".
    pub last_service: String,
}

/// The rows of one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "lowercase")]
pub enum Report {
    Revenue(Vec<RevenueRow>),
    Services(Vec<ServiceRow>),
    Technicians(Vec<TechnicianTotals>),
    Customers(Vec<CustomerRow>),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Revenue(_) => ReportKind::Revenue,
            Self::Services(_) => ReportKind::Services,
            Self::Technicians(_) => ReportKind::Technicians,
            Self::Customers(_) => ReportKind::Customers,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Revenue(rows) => rows.is_empty(),
            Self::Services(rows) => rows.is_empty(),
            Self::Technicians(rows) => rows.is_empty(),
            Self::Customers(rows) => rows.is_empty(),
        }
    }
}

/// Assemble the report of the given kind.
///
/// `sort` only applies to the revenue and services reports, the technicians
/// and customers reports are always ordered by value.
pub fn build_report(
    kind: ReportKind,
    records: &[ServiceRecord],
    vehicles: &[Vehicle],
    sort: ReportSort,
) -> Report {
    match kind {
        ReportKind::Revenue => Report::Revenue(revenue_report(records, vehicles, sort)),
        ReportKind::Services => Report::Services(services_report(records, vehicles, sort)),
        ReportKind::Technicians => Report::Technicians(technicians_report(records)),
        ReportKind::Customers => Report::Customers(customers_report(records, vehicles)),
    }
}

fn sort_records(records: &[ServiceRecord], sort: ReportSort) -> Vec<&ServiceRecord> {
    let mut sorted: Vec<&ServiceRecord> = records.iter().collect();

    match sort {
        ReportSort::Date => sorted.sort_by(|a, b| b.date.cmp(&a.date)),
        ReportSort::Value => sorted.sort_by(|a, b| b.net_value().total_cmp(&a.net_value())),
    }

    sorted
}

pub fn revenue_report(
    records: &[ServiceRecord],
    vehicles: &[Vehicle],
    sort: ReportSort,
) -> Vec<RevenueRow> {
    let vehicles_by_id = index_vehicles(vehicles);

    sort_records(records, sort)
        .into_iter()
        .map(|record| RevenueRow {
            date: record.date,
            customer: vehicles_by_id
                .get(record.vehicle_id.as_str())
                .map_or(UNKNOWN_LABEL, |vehicle| vehicle.owner.as_str())
                .to_owned(),
            service_type: record.service_type.clone(),
            technician: record
                .technician_name()
                .unwrap_or(UNASSIGNED_LABEL)
                .to_owned(),
            parts: record.parts_total(),
            labor: record.labor_cost,
            discount: record.discount,
            net_total: record.net_value(),
        })
        .collect()
}

pub fn services_report(
    records: &[ServiceRecord],
    vehicles: &[Vehicle],
    sort: ReportSort,
) -> Vec<ServiceRow> {
    let vehicles_by_id = index_vehicles(vehicles);

    sort_records(records, sort)
        .into_iter()
        .map(|record| {
            let (customer, vehicle) = match vehicles_by_id.get(record.vehicle_id.as_str()) {
                Some(vehicle) => (vehicle.owner.clone(), vehicle.display_name()),
                None => (UNKNOWN_LABEL.to_owned(), UNKNOWN_LABEL.to_owned()),
            };

            ServiceRow {
                date: record.date,
                customer,
                vehicle,
                service_type: record.service_type.clone(),
                technician: record
                    .technician_name()
                    .unwrap_or(UNASSIGNED_LABEL)
                    .to_owned(),
                status: ServiceStatus::of(record),
                notes: record
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|notes| !notes.is_empty())
                    .unwrap_or(NO_NOTES_LABEL)
                    .to_owned(),
            }
        })
        .collect()
}

/// Totals per technician, highest net total first.
pub fn technicians_report(records: &[ServiceRecord]) -> Vec<TechnicianTotals> {
    let mut rows = by_technician(records);
    rows.sort_by(|a, b| b.net_value.total_cmp(&a.net_value));
    rows
}

/// Totals per owner, highest total spent first.
pub fn customers_report(records: &[ServiceRecord], vehicles: &[Vehicle]) -> Vec<CustomerRow> {
    let mut customers = by_customer(records, vehicles);
    customers.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));

    customers
        .into_iter()
        .map(|customer| CustomerRow {
            customer: customer.owner,
            services: customer.services,
            vehicles: customer.vehicles,
            total_spent: customer.total_spent,
            last_service: format_long_date(customer.last_service),
        })
        .collect()
}

/// Format a date like "1 May 2024".
pub fn format_long_date(date: Date) -> String {
    format!("{} {} {}", date.day(), date.month(), date.year())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::analytics::{
        reports::{
            NO_NOTES_LABEL, Report, ReportKind, ReportSort, ServiceStatus, UNASSIGNED_LABEL,
            UNKNOWN_LABEL, build_report, customers_report, format_long_date, revenue_report,
            services_report, technicians_report,
        },
        test_utils::{part, priced_record, record, vehicle},
    };

    #[test]
    fn revenue_rows_resolve_customers_and_defaults() {
        let vehicles = vec![vehicle("V1", "Alice")];
        let mut known = priced_record("S1", "V1", date!(2024 - 05 - 01), 45.0, Some("Bob"));
        known.parts = vec![part("Filter", 15.0), part("Oil", 40.0)];
        known.discount = 10.0;
        let unknown = priced_record("S2", "gone", date!(2024 - 04 - 01), 20.0, None);

        let rows = revenue_report(&[known, unknown], &vehicles, ReportSort::Date);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].customer, "Alice");
        assert_eq!(rows[0].technician, "Bob");
        assert_eq!(rows[0].parts, 55.0);
        assert_eq!(rows[0].labor, 45.0);
        assert_eq!(rows[0].discount, 10.0);
        assert_eq!(rows[0].net_total, 90.0);
        assert_eq!(rows[1].customer, UNKNOWN_LABEL);
        assert_eq!(rows[1].technician, UNASSIGNED_LABEL);
    }

    #[test]
    fn per_record_reports_sort_by_date_or_value() {
        let vehicles = vec![vehicle("V1", "Alice")];
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 03 - 01), 80.0, None),
            priced_record("S2", "V1", date!(2024 - 05 - 01), 10.0, None),
            priced_record("S3", "V1", date!(2024 - 04 - 01), 80.0, None),
        ];

        let by_date = revenue_report(&records, &vehicles, ReportSort::Date);
        let by_value = revenue_report(&records, &vehicles, ReportSort::Value);

        let dates: Vec<_> = by_date.iter().map(|row| row.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 05 - 01),
                date!(2024 - 04 - 01),
                date!(2024 - 03 - 01)
            ]
        );
        // Equal values keep their input order.
        let dates: Vec<_> = by_value.iter().map(|row| row.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 03 - 01),
                date!(2024 - 04 - 01),
                date!(2024 - 05 - 01)
            ]
        );
    }

    #[test]
    fn service_rows_derive_status_and_notes() {
        let vehicles = vec![vehicle("V1", "Alice")];
        let mut completed = record("S1", "V1", date!(2024 - 05 - 02));
        completed.kilometers = 1200;
        completed.notes = Some("Replaced chain".to_owned());
        let mut pending = record("S2", "gone", date!(2024 - 05 - 01));
        pending.notes = Some("   ".to_owned());

        let rows = services_report(&[completed, pending], &vehicles, ReportSort::Date);

        assert_eq!(rows[0].status, ServiceStatus::Completed);
        assert_eq!(rows[0].status.as_str(), "Completed");
        assert_eq!(rows[0].notes, "Replaced chain");
        assert_eq!(rows[0].vehicle, "Toyota Hilux");
        assert_eq!(rows[1].status, ServiceStatus::Pending);
        assert_eq!(rows[1].notes, NO_NOTES_LABEL);
        assert_eq!(rows[1].customer, UNKNOWN_LABEL);
        assert_eq!(rows[1].vehicle, UNKNOWN_LABEL);
    }

    #[test]
    fn technicians_report_is_sorted_by_net_total() {
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 05 - 01), 10.0, Some("Bob")),
            priced_record("S2", "V1", date!(2024 - 05 - 02), 90.0, Some("Carol")),
            priced_record("S3", "V1", date!(2024 - 05 - 03), 15.0, Some("Bob")),
            priced_record("S4", "V1", date!(2024 - 05 - 04), 500.0, None),
        ];

        let rows = technicians_report(&records);

        let got: Vec<_> = rows
            .iter()
            .map(|row| (row.name.as_str(), row.services, row.net_value))
            .collect();
        assert_eq!(got, vec![("Carol", 1, 90.0), ("Bob", 2, 25.0)]);
    }

    #[test]
    fn customers_report_is_sorted_by_total_spent() {
        let vehicles = vec![
            vehicle("V1", "Alice"),
            vehicle("V2", "Dan"),
            vehicle("V3", "Dan"),
        ];
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 05 - 01), 50.0, None),
            priced_record("S2", "V2", date!(2024 - 04 - 01), 40.0, None),
            priced_record("S3", "V3", date!(2024 - 03 - 01), 40.0, None),
        ];

        let rows = customers_report(&records, &vehicles);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].customer, "Dan");
        assert_eq!(rows[0].services, 2);
        assert_eq!(rows[0].vehicles, 2);
        assert_eq!(rows[0].total_spent, 80.0);
        assert_eq!(rows[0].last_service, "1 April 2024");
        assert_eq!(rows[1].customer, "Alice");
    }

    #[test]
    fn long_dates_have_no_padding() {
        assert_eq!(format_long_date(date!(2024 - 05 - 01)), "1 May 2024");
        assert_eq!(format_long_date(date!(2023 - 12 - 25)), "25 December 2023");
    }

    #[test]
    fn build_report_returns_requested_kind() {
        for kind in ReportKind::ALL {
            let report = build_report(kind, &[], &[], ReportSort::default());

            assert_eq!(report.kind(), kind);
            assert!(report.is_empty());
        }
    }

    #[test]
    fn report_kind_parses_query_values() {
        assert_eq!("technicians".parse(), Ok(ReportKind::Technicians));
        assert!("payroll".parse::<ReportKind>().is_err());
        assert!(matches!(
            build_report(ReportKind::Customers, &[], &[], ReportSort::Value),
            Report::Customers(_)
        ));
    }
}
