//! Group service records by month, day, service type, technician and customer.
//!
//! The time series are dense: every period in range has an entry, zero-filled
//! when no records fall in it, so that chart axes stay stable.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use time::{Date, Duration, Month, Weekday};

use crate::{
    analytics::window::{is_in_month, subtract_months},
    service_record::ServiceRecord,
    vehicle::Vehicle,
};

/// The number of months in the monthly revenue series.
pub const MONTHLY_SERIES_LENGTH: u32 = 6;
/// The number of days in the daily services series.
pub const DAILY_SERIES_LENGTH: i64 = 7;

/// Colours assigned to service types by their rank.
pub const SERVICE_TYPE_PALETTE: [&str; 8] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

/// Revenue and service count for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    /// The month and two digit year, e.g. "May 24".
    pub label: String,
    pub year: i32,
    /// The month number, 1 to 12.
    pub month: u8,
    pub revenue: f64,
    pub services: usize,
}

/// Service count and revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyServices {
    /// The short weekday name, e.g. "Tue".
    pub label: String,
    pub date: Date,
    pub services: usize,
    pub revenue: f64,
}

/// The number of records for one service type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceTypeCount {
    pub service_type: String,
    pub count: usize,
    pub color: &'static str,
}

/// Totals for the services performed by one technician.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicianTotals {
    pub name: String,
    pub services: usize,
    pub parts: f64,
    pub labor: f64,
    pub discount: f64,
    pub net_value: f64,
}

/// Totals for the services of all vehicles belonging to one owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerTotals {
    pub owner: String,
    pub services: usize,
    /// The number of distinct vehicles serviced.
    pub vehicles: usize,
    pub total_spent: f64,
    pub last_service: Date,
}

/// Index vehicles by their ID for owner and display name lookups.
pub fn index_vehicles(vehicles: &[Vehicle]) -> HashMap<&str, &Vehicle> {
    vehicles
        .iter()
        .map(|vehicle| (vehicle.id.as_str(), vehicle))
        .collect()
}

pub(crate) fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn weekday_abbreviation(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

/// Revenue per month for the six calendar months ending with today's month, oldest first.
pub fn monthly_revenue(records: &[ServiceRecord], today: Date) -> Vec<MonthlyRevenue> {
    (0..MONTHLY_SERIES_LENGTH)
        .rev()
        .map(|months_ago| {
            // Anchor on the first so that the overflow in `subtract_months` never skips a month.
            let month_start = subtract_months(today.replace_day(1).unwrap_or(today), months_ago);
            let (year, month) = (month_start.year(), month_start.month());

            let (revenue, services) = records
                .iter()
                .filter(|record| is_in_month(record.date, year, month))
                .fold((0.0, 0), |(revenue, services), record| {
                    (revenue + record.net_value(), services + 1)
                });

            MonthlyRevenue {
                label: format!(
                    "{} {:02}",
                    month_abbreviation(month),
                    year.rem_euclid(100)
                ),
                year,
                month: u8::from(month),
                revenue,
                services,
            }
        })
        .collect()
}

/// Services per day for today and the six days before it, oldest first.
///
/// Records are matched on their exact date, so each weekday label refers only
/// to the most recent day with that name.
pub fn daily_services(records: &[ServiceRecord], today: Date) -> Vec<DailyServices> {
    (0..DAILY_SERIES_LENGTH)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);

            let (revenue, services) = records
                .iter()
                .filter(|record| record.date == date)
                .fold((0.0, 0), |(revenue, services), record| {
                    (revenue + record.net_value(), services + 1)
                });

            DailyServices {
                label: weekday_abbreviation(date.weekday()).to_owned(),
                date,
                services,
                revenue,
            }
        })
        .collect()
}

/// Count records per service type, most common first.
///
/// Types with equal counts keep the order they were first seen in. Each type
/// is given the palette colour for its rank, wrapping around the palette.
pub fn service_type_distribution(records: &[ServiceRecord]) -> Vec<ServiceTypeCount> {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for record in records {
        match counts
            .iter_mut()
            .find(|(service_type, _)| *service_type == record.service_type)
        {
            Some((_, count)) => *count += 1,
            None => counts.push((record.service_type.as_str(), 1)),
        }
    }

    // `sort_by` is stable, ties keep their first-seen order.
    counts.sort_by(|(_, a), (_, b)| b.cmp(a));

    counts
        .into_iter()
        .enumerate()
        .map(|(rank, (service_type, count))| ServiceTypeCount {
            service_type: service_type.to_owned(),
            count,
            color: SERVICE_TYPE_PALETTE[rank % SERVICE_TYPE_PALETTE.len()],
        })
        .collect()
}

/// Totals per technician in the order technicians are first seen.
///
/// Records without a technician are left out.
pub fn by_technician(records: &[ServiceRecord]) -> Vec<TechnicianTotals> {
    let mut totals: Vec<TechnicianTotals> = Vec::new();

    for record in records {
        let Some(name) = record.technician_name() else {
            continue;
        };

        let position = match totals.iter().position(|entry| entry.name == name) {
            Some(position) => position,
            None => {
                totals.push(TechnicianTotals {
                    name: name.to_owned(),
                    services: 0,
                    parts: 0.0,
                    labor: 0.0,
                    discount: 0.0,
                    net_value: 0.0,
                });
                totals.len() - 1
            }
        };

        let entry = &mut totals[position];
        entry.services += 1;
        entry.parts += record.parts_total();
        entry.labor += record.labor_cost;
        entry.discount += record.discount;
        entry.net_value += record.net_value();
    }

    totals
}

/// The distinct technician names in alphabetical order.
pub fn technician_names(records: &[ServiceRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(ServiceRecord::technician_name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Totals per vehicle owner in the order owners are first seen.
///
/// The owner's name identifies the customer, so different owners sharing a
/// name are combined. Records for unknown vehicles are left out.
pub fn by_customer(records: &[ServiceRecord], vehicles: &[Vehicle]) -> Vec<CustomerTotals> {
    let vehicles_by_id = index_vehicles(vehicles);
    let mut totals: Vec<(CustomerTotals, HashSet<&str>)> = Vec::new();

    for record in records {
        let Some(vehicle) = vehicles_by_id.get(record.vehicle_id.as_str()) else {
            continue;
        };

        let position = match totals
            .iter()
            .position(|(entry, _)| entry.owner == vehicle.owner)
        {
            Some(position) => position,
            None => {
                totals.push((
                    CustomerTotals {
                        owner: vehicle.owner.clone(),
                        services: 0,
                        vehicles: 0,
                        total_spent: 0.0,
                        last_service: record.date,
                    },
                    HashSet::new(),
                ));
                totals.len() - 1
            }
        };

        let (entry, vehicle_ids) = &mut totals[position];
        vehicle_ids.insert(record.vehicle_id.as_str());
        entry.services += 1;
        entry.vehicles = vehicle_ids.len();
        entry.total_spent += record.net_value();
        entry.last_service = entry.last_service.max(record.date);
    }

    totals.into_iter().map(|(totals, _)| totals).collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::analytics::{
        grouping::{
            SERVICE_TYPE_PALETTE, by_customer, by_technician, daily_services, monthly_revenue,
            service_type_distribution,
        },
        test_utils::{part, priced_record, record, vehicle},
    };

    #[test]
    fn monthly_revenue_is_dense_and_chronological() {
        let today = date!(2024 - 05 - 20);
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 05 - 01), 50.0, None),
            priced_record("S2", "V1", date!(2024 - 03 - 31), 20.0, None),
            priced_record("S3", "V1", date!(2024 - 03 - 01), 30.0, None),
            priced_record("S4", "V1", date!(2023 - 11 - 30), 99.0, None),
        ];

        let series = monthly_revenue(&records, today);

        let labels: Vec<_> = series.iter().map(|entry| entry.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Dec 23", "Jan 24", "Feb 24", "Mar 24", "Apr 24", "May 24"]
        );
        let revenue: Vec<_> = series.iter().map(|entry| entry.revenue).collect();
        assert_eq!(revenue, vec![0.0, 0.0, 0.0, 50.0, 0.0, 50.0]);
        let services: Vec<_> = series.iter().map(|entry| entry.services).collect();
        assert_eq!(services, vec![0, 0, 0, 2, 0, 1]);
    }

    #[test]
    fn monthly_revenue_has_six_entries_for_empty_input() {
        let series = monthly_revenue(&[], date!(2024 - 01 - 31));

        assert_eq!(series.len(), 6);
        assert_eq!(series[0].label, "Aug 23");
        assert_eq!(series[5].label, "Jan 24");
        assert!(series.iter().all(|entry| entry.services == 0));
    }

    #[test]
    fn monthly_revenue_does_not_skip_short_months() {
        let series = monthly_revenue(&[], date!(2024 - 03 - 31));

        let months: Vec<_> = series.iter().map(|entry| entry.month).collect();
        assert_eq!(months, vec![10, 11, 12, 1, 2, 3]);
    }

    #[test]
    fn daily_services_matches_exact_dates() {
        let today = date!(2024 - 05 - 15);
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 05 - 15), 10.0, None),
            priced_record("S2", "V1", date!(2024 - 05 - 15), 15.0, None),
            priced_record("S3", "V1", date!(2024 - 05 - 09), 20.0, None),
            // Same weekday as 2024-05-15, but a week earlier.
            priced_record("S4", "V1", date!(2024 - 05 - 08), 40.0, None),
        ];

        let series = daily_services(&records, today);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, date!(2024 - 05 - 09));
        assert_eq!(series[0].label, "Thu");
        assert_eq!(series[0].services, 1);
        assert_eq!(series[6].date, today);
        assert_eq!(series[6].label, "Wed");
        assert_eq!(series[6].services, 2);
        assert_eq!(series[6].revenue, 25.0);
        let total: usize = series.iter().map(|entry| entry.services).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn service_types_are_sorted_by_count_with_stable_ties() {
        let mut records = Vec::new();
        for (index, service_type) in ["Tyres", "Oil Change", "Brakes", "Oil Change", "Brakes"]
            .into_iter()
            .enumerate()
        {
            let mut record = record(&format!("S{index}"), "V1", date!(2024 - 05 - 01));
            record.service_type = service_type.to_owned();
            records.push(record);
        }

        let distribution = service_type_distribution(&records);

        let got: Vec<_> = distribution
            .iter()
            .map(|entry| (entry.service_type.as_str(), entry.count, entry.color))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Oil Change", 2, SERVICE_TYPE_PALETTE[0]),
                ("Brakes", 2, SERVICE_TYPE_PALETTE[1]),
                ("Tyres", 1, SERVICE_TYPE_PALETTE[2]),
            ]
        );
    }

    #[test]
    fn service_type_colours_wrap_around_the_palette() {
        let records: Vec<_> = (0..SERVICE_TYPE_PALETTE.len() + 2)
            .map(|index| {
                let mut record = record(&format!("S{index}"), "V1", date!(2024 - 05 - 01));
                record.service_type = format!("Type {index}");
                record
            })
            .collect();

        let distribution = service_type_distribution(&records);

        assert_eq!(
            distribution[SERVICE_TYPE_PALETTE.len()].color,
            SERVICE_TYPE_PALETTE[0]
        );
        assert_eq!(
            distribution[SERVICE_TYPE_PALETTE.len() + 1].color,
            SERVICE_TYPE_PALETTE[1]
        );
    }

    #[test]
    fn technician_totals_skip_unassigned_records() {
        let mut with_parts = priced_record("S1", "V1", date!(2024 - 05 - 01), 45.0, Some("Bob"));
        with_parts.parts = vec![part("Filter", 15.0)];
        with_parts.discount = 10.0;
        let records = vec![
            with_parts,
            priced_record("S2", "V1", date!(2024 - 05 - 02), 30.0, Some("Carol")),
            priced_record("S3", "V1", date!(2024 - 05 - 03), 25.0, None),
            priced_record("S4", "V1", date!(2024 - 05 - 04), 20.0, Some("  ")),
            priced_record("S5", "V1", date!(2024 - 05 - 05), 5.0, Some("Bob")),
        ];

        let totals = by_technician(&records);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "Bob");
        assert_eq!(totals[0].services, 2);
        assert_eq!(totals[0].parts, 15.0);
        assert_eq!(totals[0].labor, 50.0);
        assert_eq!(totals[0].discount, 10.0);
        assert_eq!(totals[0].net_value, 55.0);
        assert_eq!(totals[1].name, "Carol");
        assert_eq!(totals[1].net_value, 30.0);
    }

    #[test]
    fn customer_totals_are_keyed_by_owner() {
        let vehicles = vec![
            vehicle("V1", "Alice"),
            vehicle("V2", "Alice"),
            vehicle("V3", "Dan"),
        ];
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 04 - 01), 50.0, None),
            priced_record("S2", "V2", date!(2024 - 05 - 10), 25.0, None),
            priced_record("S3", "V1", date!(2024 - 03 - 01), 25.0, None),
            priced_record("S4", "V3", date!(2024 - 02 - 01), 10.0, None),
            priced_record("S5", "gone", date!(2024 - 05 - 11), 500.0, None),
        ];

        let totals = by_customer(&records, &vehicles);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].owner, "Alice");
        assert_eq!(totals[0].services, 3);
        assert_eq!(totals[0].vehicles, 2);
        assert_eq!(totals[0].total_spent, 100.0);
        assert_eq!(totals[0].last_service, date!(2024 - 05 - 10));
        assert_eq!(totals[1].owner, "Dan");
        assert_eq!(totals[1].vehicles, 1);
    }
}
