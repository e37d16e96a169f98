//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/calls/{vehicle_id}', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page with metric cards and charts.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for viewing reports as tables.
pub const REPORTS_VIEW: &str = "/reports";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for the dashboard summary as JSON.
pub const DASHBOARD_API: &str = "/api/dashboard";
/// The route for exporting a report as CSV.
pub const REPORT_EXPORT: &str = "/api/reports/{kind}";
/// The route to list and register vehicles.
pub const VEHICLES_API: &str = "/api/vehicles";
/// The route to list and create service records.
pub const SERVICE_RECORDS_API: &str = "/api/service-records";
/// The route to list call records.
pub const CALLS_API: &str = "/api/calls";
/// The route to update the call record of a vehicle.
pub const CALL_API: &str = "/api/calls/{vehicle_id}";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/reports/{kind}', '{kind}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
