//! The complete set of dashboard figures for one snapshot and filter.

use std::collections::HashSet;

use serde::Serialize;
use time::Date;

use crate::{
    analytics::{
        grouping::{
            DailyServices, MonthlyRevenue, ServiceTypeCount, TechnicianTotals, by_technician,
            daily_services, monthly_revenue, service_type_distribution, technician_names,
        },
        metrics::{
            TopPerformer, average_monthly_growth, average_service_value, customer_lifetime_value,
            monthly_services, repeat_business_rate, round_half_up, top_performer,
            total_net_value,
        },
        window::{TechnicianFilter, TimeWindow, filter_by_technician, filter_by_window},
    },
    call_record::CallRecord,
    service_record::ServiceRecord,
    vehicle::{Vehicle, VehicleStatus},
};

/// The headline numbers shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    /// Total net value, rounded to whole currency units.
    pub total_revenue: f64,
    /// Mean net value per service, rounded to whole currency units.
    pub average_service_value: f64,
    pub total_services: usize,
    /// Services dated in the current calendar month.
    pub monthly_services: usize,
    /// Percent of serviced vehicles with more than one service.
    pub repeat_business_rate: f64,
    /// Mean month-over-month revenue change in percent.
    pub average_monthly_growth: f64,
    /// Mean amount spent per customer, rounded to whole currency units.
    pub customer_lifetime_value: f64,
    pub top_performer: TopPerformer,
}

/// The number of vehicles in each service status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetStatus {
    pub total: usize,
    pub active: usize,
    pub upcoming: usize,
    pub overdue: usize,
}

impl FleetStatus {
    pub fn count(vehicles: &[Vehicle]) -> Self {
        vehicles
            .iter()
            .fold(Self::default(), |mut counts, vehicle| {
                counts.total += 1;
                match vehicle.status {
                    VehicleStatus::Active => counts.active += 1,
                    VehicleStatus::Upcoming => counts.upcoming += 1,
                    VehicleStatus::Overdue => counts.overdue += 1,
                }
                counts
            })
    }
}

/// Vehicles due for service whose owners have not been called yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FollowUps {
    pub overdue: usize,
    pub upcoming: usize,
}

impl FollowUps {
    pub fn count(vehicles: &[Vehicle], call_records: &[CallRecord]) -> Self {
        let called: HashSet<&str> = call_records
            .iter()
            .filter(|call| call.called)
            .map(|call| call.vehicle_id.as_str())
            .collect();

        vehicles
            .iter()
            .filter(|vehicle| !called.contains(vehicle.id.as_str()))
            .fold(Self::default(), |mut counts, vehicle| {
                match vehicle.status {
                    VehicleStatus::Overdue => counts.overdue += 1,
                    VehicleStatus::Upcoming => counts.upcoming += 1,
                    VehicleStatus::Active => {}
                }
                counts
            })
    }
}

/// Everything the dashboard shows for one window and technician filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub today: Date,
    pub window: TimeWindow,
    /// The technician filter's query value, "all" for every technician.
    pub technician: String,
    pub metrics: DashboardMetrics,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub daily_services: Vec<DailyServices>,
    pub service_types: Vec<ServiceTypeCount>,
    pub technician_earnings: Vec<TechnicianTotals>,
    /// Every technician named in any record, sorted by name.
    pub technicians: Vec<String>,
    pub fleet: FleetStatus,
    pub follow_ups: FollowUps,
}

impl DashboardSummary {
    /// Compute the dashboard figures.
    ///
    /// The metrics and distributions use the records in `window` performed by
    /// `technician`. The monthly and daily series and the monthly services
    /// count only apply the technician filter since they cover their own
    /// fixed periods.
    ///
    /// `records` should be ordered newest first so that ties for the top
    /// performer are resolved the same way on every call.
    pub fn compute(
        vehicles: &[Vehicle],
        records: &[ServiceRecord],
        call_records: &[CallRecord],
        window: TimeWindow,
        technician: &TechnicianFilter,
        today: Date,
    ) -> Self {
        let technician_records = filter_by_technician(records, technician);
        let windowed_records = filter_by_window(&technician_records, window, today);
        let monthly_revenue = monthly_revenue(&technician_records, today);

        let metrics = DashboardMetrics {
            total_revenue: round_half_up(total_net_value(&windowed_records)),
            average_service_value: round_half_up(average_service_value(&windowed_records)),
            total_services: windowed_records.len(),
            monthly_services: monthly_services(&technician_records, today),
            repeat_business_rate: repeat_business_rate(&windowed_records),
            average_monthly_growth: average_monthly_growth(&monthly_revenue),
            customer_lifetime_value: round_half_up(customer_lifetime_value(
                &windowed_records,
                vehicles,
            )),
            top_performer: top_performer(&windowed_records),
        };

        Self {
            today,
            window,
            technician: technician.as_query_value().to_owned(),
            metrics,
            monthly_revenue,
            daily_services: daily_services(&technician_records, today),
            service_types: service_type_distribution(&windowed_records),
            technician_earnings: by_technician(&windowed_records),
            technicians: technician_names(records),
            fleet: FleetStatus::count(vehicles),
            follow_ups: FollowUps::count(vehicles, call_records),
        }
    }
}
