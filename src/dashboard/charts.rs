//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations from a dashboard summary:
//! - **Monthly Revenue**: Net revenue for the last six months
//! - **Daily Services**: Services performed on each of the last seven days
//! - **Service Types**: Share of services by type for the selected window
//! - **Technician Earnings**: Net revenue per technician for the selected window
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, JsFunction, Orient, Tooltip,
        Trigger,
    },
    series::{Bar, Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    analytics::{DailyServices, MonthlyRevenue, ServiceTypeCount, TechnicianTotals, TimeWindow},
    html::HeadElement,
};

/// Where the ECharts library is loaded from.
pub(super) const ECHARTS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@5.6.0/dist/echarts.min.js";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn monthly_revenue_chart(series: &[MonthlyRevenue]) -> Chart {
    let labels: Vec<String> = series.iter().map(|month| month.label.clone()).collect();
    let values: Vec<f64> = series.iter().map(|month| month.revenue).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Monthly Revenue")
                .subtext("Last six months"),
        )
        .tooltip(currency_tooltip())
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Revenue").data(values))
}

pub(super) fn daily_services_chart(series: &[DailyServices]) -> Chart {
    let labels: Vec<String> = series.iter().map(|day| day.label.clone()).collect();
    let values: Vec<i64> = series.iter().map(|day| day.services as i64).collect();

    Chart::new()
        .title(Title::new().text("Daily Services").subtext("Last seven days"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Bar::new().name("Services").data(values))
}

pub(super) fn service_types_chart(
    distribution: &[ServiceTypeCount],
    window: TimeWindow,
) -> Chart {
    let colors: Vec<Color> = distribution
        .iter()
        .map(|service_type| Color::from(service_type.color))
        .collect();
    let data: Vec<(f64, &str)> = distribution
        .iter()
        .map(|service_type| (service_type.count as f64, service_type.service_type.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Service Types").subtext(window.label()))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().orient(Orient::Vertical).right(10).top("middle"))
        .color(colors)
        .series(
            Pie::new()
                .name("Services")
                .radius(vec!["40%", "70%"])
                .center(vec!["40%", "55%"])
                .data(data),
        )
}

pub(super) fn technician_earnings_chart(
    technicians: &[TechnicianTotals],
    window: TimeWindow,
) -> Chart {
    let names: Vec<String> = technicians
        .iter()
        .map(|technician| technician.name.clone())
        .collect();
    let values: Vec<f64> = technicians
        .iter()
        .map(|technician| technician.net_value)
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Technician Earnings")
                .subtext(window.label()),
        )
        .tooltip(currency_tooltip())
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(names))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Net revenue").data(values))
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use crate::{
        analytics::{MonthlyRevenue, SERVICE_TYPE_PALETTE, ServiceTypeCount, TimeWindow},
        html::HeadElement,
    };

    use super::{DashboardChart, charts_script, monthly_revenue_chart, service_types_chart};

    #[test]
    fn monthly_chart_uses_series_labels() {
        let series = vec![
            MonthlyRevenue {
                label: "Apr 24".to_owned(),
                year: 2024,
                month: 4,
                revenue: 120.0,
                services: 2,
            },
            MonthlyRevenue {
                label: "May 24".to_owned(),
                year: 2024,
                month: 5,
                revenue: 80.5,
                services: 1,
            },
        ];

        let options = monthly_revenue_chart(&series).to_string();

        assert!(options.contains("Apr 24"));
        assert!(options.contains("May 24"));
        assert!(options.contains("80.5"));
    }

    #[test]
    fn service_type_chart_uses_palette_colours() {
        let distribution = vec![
            ServiceTypeCount {
                service_type: "Oil Change".to_owned(),
                count: 3,
                color: SERVICE_TYPE_PALETTE[0],
            },
            ServiceTypeCount {
                service_type: "Tyre Rotation".to_owned(),
                count: 1,
                color: SERVICE_TYPE_PALETTE[1],
            },
        ];

        let options = service_types_chart(&distribution, TimeWindow::Month).to_string();

        assert!(options.contains(SERVICE_TYPE_PALETTE[0]));
        assert!(options.contains(SERVICE_TYPE_PALETTE[1]));
        assert!(options.contains("Tyre Rotation"));
    }

    #[test]
    fn script_initializes_every_chart() {
        let charts = [
            DashboardChart {
                id: "first-chart",
                options: "{}".to_owned(),
            },
            DashboardChart {
                id: "second-chart",
                options: "{}".to_owned(),
            },
        ];

        let HeadElement::ScriptSource(script) = charts_script(&charts) else {
            panic!("expected inline script");
        };

        assert!(script.0.contains("document.getElementById(\"first-chart\")"));
        assert!(script.0.contains("document.getElementById(\"second-chart\")"));
    }
}
