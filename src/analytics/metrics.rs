//! Headline metrics derived from service records.

use std::collections::HashMap;

use serde::Serialize;
use time::Date;

use crate::{
    analytics::{
        grouping::{MonthlyRevenue, by_customer, by_technician},
        window::is_in_month,
    },
    service_record::ServiceRecord,
    vehicle::Vehicle,
};

/// The name reported when no record has a technician.
pub const NO_TOP_PERFORMER: &str = "N/A";

/// The technician who performed the most services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPerformer {
    pub name: String,
    pub services: usize,
}

impl Default for TopPerformer {
    fn default() -> Self {
        Self {
            name: NO_TOP_PERFORMER.to_owned(),
            services: 0,
        }
    }
}

/// Round to the nearest whole number, with halves rounded towards positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to two decimal places using [round_half_up].
pub fn round_to_cents(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// The sum of the net value of all records.
pub fn total_net_value(records: &[ServiceRecord]) -> f64 {
    records.iter().map(ServiceRecord::net_value).sum()
}

/// The mean net value of the records, or zero when there are none.
pub fn average_service_value(records: &[ServiceRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    total_net_value(records) / records.len() as f64
}

/// The number of records dated in the same calendar month as `today`.
pub fn monthly_services(records: &[ServiceRecord], today: Date) -> usize {
    records
        .iter()
        .filter(|record| is_in_month(record.date, today.year(), today.month()))
        .count()
}

/// The percentage of serviced vehicles that were serviced more than once,
/// rounded to a whole number. Zero when no vehicle has been serviced.
pub fn repeat_business_rate(records: &[ServiceRecord]) -> f64 {
    let mut visits: HashMap<&str, usize> = HashMap::new();

    for record in records {
        *visits.entry(record.vehicle_id.as_str()).or_insert(0) += 1;
    }

    if visits.is_empty() {
        return 0.0;
    }

    let repeat_vehicles = visits.values().filter(|&&count| count > 1).count();

    round_half_up(repeat_vehicles as f64 / visits.len() as f64 * 100.0)
}

/// The mean month-over-month revenue change in percent, to two decimal places.
///
/// Transitions out of a month with no revenue are skipped. Returns zero when
/// fewer than two transitions remain.
pub fn average_monthly_growth(series: &[MonthlyRevenue]) -> f64 {
    let changes: Vec<f64> = series
        .windows(2)
        .filter(|pair| pair[0].revenue != 0.0)
        .map(|pair| (pair[1].revenue - pair[0].revenue) / pair[0].revenue * 100.0)
        .collect();

    if changes.len() < 2 {
        return 0.0;
    }

    round_to_cents(changes.iter().sum::<f64>() / changes.len() as f64)
}

/// The mean amount spent per customer, or zero when there are no customers.
///
/// Customers are identified by the owner of the serviced vehicle.
pub fn customer_lifetime_value(records: &[ServiceRecord], vehicles: &[Vehicle]) -> f64 {
    let customers = by_customer(records, vehicles);

    if customers.is_empty() {
        return 0.0;
    }

    customers
        .iter()
        .map(|customer| customer.total_spent)
        .sum::<f64>()
        / customers.len() as f64
}

/// The technician with the most records.
///
/// Ties go to the technician seen first in `records`, so callers should pass
/// records in a fixed order, e.g. newest first.
pub fn top_performer(records: &[ServiceRecord]) -> TopPerformer {
    let mut top = TopPerformer::default();

    for technician in by_technician(records) {
        if technician.services > top.services {
            top = TopPerformer {
                name: technician.name,
                services: technician.services,
            };
        }
    }

    top
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::analytics::{
        grouping::monthly_revenue,
        metrics::{
            TopPerformer, average_monthly_growth, average_service_value, customer_lifetime_value,
            monthly_services, repeat_business_rate, round_half_up, top_performer,
            total_net_value,
        },
        test_utils::{part, priced_record, record, vehicle},
    };

    #[test]
    fn single_record_scenario() {
        let vehicles = vec![vehicle("V1", "Alice")];
        let mut service = record("S1", "V1", date!(2024 - 05 - 01));
        service.service_type = "Oil Change".to_owned();
        service.parts = vec![part("Filter", 15.0)];
        service.labor_cost = 45.0;
        service.discount = 10.0;
        service.technician = Some("Bob".to_owned());
        service.kilometers = 1000;
        let records = vec![service];

        assert_eq!(average_service_value(&records), 50.0);
        assert_eq!(
            top_performer(&records),
            TopPerformer {
                name: "Bob".to_owned(),
                services: 1
            }
        );
        assert_eq!(repeat_business_rate(&records), 0.0);
        assert_eq!(customer_lifetime_value(&records, &vehicles), 50.0);
    }

    #[test]
    fn average_times_count_is_total() {
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 05 - 01), 10.1, None),
            priced_record("S2", "V2", date!(2024 - 05 - 02), 20.2, None),
            priced_record("S3", "V3", date!(2024 - 05 - 03), -3.3, None),
        ];

        let average = average_service_value(&records);

        assert!((average * records.len() as f64 - total_net_value(&records)).abs() < 1e-9);
    }

    #[test]
    fn empty_input_gives_zeroed_metrics() {
        assert_eq!(average_service_value(&[]), 0.0);
        assert_eq!(repeat_business_rate(&[]), 0.0);
        assert_eq!(customer_lifetime_value(&[], &[]), 0.0);
        assert_eq!(monthly_services(&[], date!(2024 - 05 - 01)), 0);
        assert_eq!(top_performer(&[]), TopPerformer::default());
        assert_eq!(TopPerformer::default().name, "N/A");
    }

    #[test]
    fn repeat_rate_is_100_when_every_vehicle_returns() {
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 04 - 01), 30.0, None),
            priced_record("S2", "V1", date!(2024 - 05 - 01), 20.0, None),
        ];

        assert_eq!(repeat_business_rate(&records), 100.0);

        let series = monthly_revenue(&records, date!(2024 - 05 - 15));
        let non_zero: Vec<_> = series.iter().filter(|entry| entry.revenue != 0.0).collect();
        assert_eq!(non_zero.len(), 2);
        assert_eq!(series.iter().map(|entry| entry.revenue).sum::<f64>(), 50.0);
    }

    #[test]
    fn repeat_rate_is_rounded_to_whole_percent() {
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 04 - 01), 0.0, None),
            priced_record("S2", "V1", date!(2024 - 05 - 01), 0.0, None),
            priced_record("S3", "V2", date!(2024 - 05 - 01), 0.0, None),
            priced_record("S4", "V3", date!(2024 - 05 - 01), 0.0, None),
        ];

        assert_eq!(repeat_business_rate(&records), 33.0);
    }

    #[test]
    fn round_half_up_rounds_halves_upwards() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
    }

    #[test]
    fn monthly_services_counts_current_month_only() {
        let records = vec![
            record("S1", "V1", date!(2024 - 05 - 01)),
            record("S2", "V1", date!(2024 - 05 - 31)),
            record("S3", "V1", date!(2024 - 04 - 30)),
            record("S4", "V1", date!(2023 - 05 - 15)),
        ];

        assert_eq!(monthly_services(&records, date!(2024 - 05 - 15)), 2);
    }

    #[test]
    fn growth_skips_months_without_revenue() {
        let today = date!(2024 - 06 - 15);
        let records = vec![
            // Jan: 0, Feb: 100, Mar: 150, Apr: 0, May: 50, Jun: 100
            priced_record("S1", "V1", date!(2024 - 02 - 01), 100.0, None),
            priced_record("S2", "V1", date!(2024 - 03 - 01), 150.0, None),
            priced_record("S3", "V1", date!(2024 - 05 - 01), 50.0, None),
            priced_record("S4", "V1", date!(2024 - 06 - 01), 100.0, None),
        ];
        let series = monthly_revenue(&records, today);

        // Feb->Mar +50%, Mar->Apr -100%, May->Jun +100%
        assert_eq!(average_monthly_growth(&series), 16.67);
    }

    #[test]
    fn growth_is_zero_with_fewer_than_two_transitions() {
        let today = date!(2024 - 06 - 15);
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 05 - 01), 100.0, None),
            priced_record("S2", "V1", date!(2024 - 06 - 01), 200.0, None),
        ];
        let series = monthly_revenue(&records, today);

        assert_eq!(average_monthly_growth(&series), 0.0);
    }

    #[test]
    fn top_performer_prefers_first_seen_on_ties() {
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 05 - 03), 0.0, Some("Carol")),
            priced_record("S2", "V1", date!(2024 - 05 - 02), 0.0, Some("Bob")),
            priced_record("S3", "V1", date!(2024 - 05 - 01), 0.0, Some("Bob")),
            priced_record("S4", "V1", date!(2024 - 04 - 30), 0.0, Some("Carol")),
        ];

        assert_eq!(
            top_performer(&records),
            TopPerformer {
                name: "Carol".to_owned(),
                services: 2
            }
        );
    }

    #[test]
    fn unassigned_records_count_towards_totals_but_not_technicians() {
        let today = date!(2024 - 05 - 15);
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 05 - 01), 30.0, None),
            priced_record("S2", "V2", date!(2024 - 05 - 02), 10.0, Some("Bob")),
        ];

        assert_eq!(average_service_value(&records), 20.0);
        assert_eq!(
            top_performer(&records),
            TopPerformer {
                name: "Bob".to_owned(),
                services: 1
            }
        );
        let series = monthly_revenue(&records, today);
        assert_eq!(series[5].revenue, 40.0);
        assert_eq!(series[5].services, 2);
    }

    #[test]
    fn metrics_are_idempotent() {
        let vehicles = vec![vehicle("V1", "Alice")];
        let records = vec![
            priced_record("S1", "V1", date!(2024 - 05 - 01), 30.0, Some("Bob")),
            priced_record("S2", "V1", date!(2024 - 04 - 01), 10.0, Some("Bob")),
        ];
        let today = date!(2024 - 05 - 15);

        assert_eq!(
            monthly_revenue(&records, today),
            monthly_revenue(&records, today)
        );
        assert_eq!(top_performer(&records), top_performer(&records));
        assert_eq!(
            customer_lifetime_value(&records, &vehicles),
            customer_lifetime_value(&records, &vehicles)
        );
    }
}
