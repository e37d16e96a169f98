//! Aggregation of service records into metrics, time series and reports.
//!
//! Everything here is a pure function of the vehicles, service records, the
//! current date and the filters passed in. Callers own any caching.

mod export;
mod grouping;
mod metrics;
mod reports;
mod summary;
#[cfg(test)]
mod test_utils;
mod window;

pub use export::report_to_csv;
pub use grouping::{
    CustomerTotals, DailyServices, MonthlyRevenue, SERVICE_TYPE_PALETTE, ServiceTypeCount,
    TechnicianTotals, by_customer, by_technician, daily_services, index_vehicles,
    monthly_revenue, service_type_distribution, technician_names,
};
pub use metrics::{
    TopPerformer, average_monthly_growth, average_service_value, customer_lifetime_value,
    monthly_services, repeat_business_rate, round_half_up, top_performer, total_net_value,
};
pub use reports::{
    CustomerRow, Report, ReportKind, ReportSort, RevenueRow, ServiceRow, ServiceStatus,
    build_report, format_long_date,
};
pub use summary::{DashboardMetrics, DashboardSummary, FleetStatus, FollowUps};
pub use window::{
    TechnicianFilter, TimeWindow, filter_by_month, filter_by_technician, filter_by_window,
    subtract_months,
};
