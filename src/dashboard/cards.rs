//! Card components for the dashboard's headline numbers.
//!
//! Provides cards showing:
//! - Revenue, service counts and customer metrics for the selected window
//! - The top performing technician
//! - Vehicles by service status and the follow-up calls still to make

use maud::{Markup, html};

use crate::{
    analytics::{DashboardMetrics, FleetStatus, FollowUps, TimeWindow},
    html::format_currency_rounded,
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md flex flex-col justify-between";
const CARD_TITLE_STYLE: &str = "text-sm font-medium text-gray-600 dark:text-gray-400";
const CARD_VALUE_STYLE: &str = "text-3xl font-bold mt-2";
const CARD_CAPTION_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400 mt-1";

/// Formats a percentage, avoiding "-0%" display.
fn format_percentage(value: f64) -> String {
    if value.abs() < 0.005 {
        "0%".to_owned()
    } else if value.fract() == 0.0 {
        format!("{value:.0}%")
    } else {
        format!("{value:.2}%")
    }
}

fn growth_color_class(growth: f64) -> &'static str {
    if growth > 0.0 {
        "text-green-600 dark:text-green-400"
    } else if growth < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-gray-600 dark:text-gray-400"
    }
}

fn metric_card(title: &str, value: &str, caption: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) aria-label=(format!("{title}: {value}"))
        {
            h4 class=(CARD_TITLE_STYLE) { (title) }
            div class=(CARD_VALUE_STYLE) { (value) }
            div class=(CARD_CAPTION_STYLE) { (caption) }
        }
    }
}

/// Renders the grid of metric cards for the selected window.
pub(super) fn metric_cards_view(metrics: &DashboardMetrics, window: TimeWindow) -> Markup {
    let top_performer_caption = if metrics.top_performer.services == 1 {
        "1 service".to_owned()
    } else {
        format!("{} services", metrics.top_performer.services)
    };

    html! {
        section id="metrics" class="w-full mx-auto mb-8"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Overview" }
                span class="text-sm text-gray-600 dark:text-gray-400" { (window.label()) }
            }

            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4"
            {
                (metric_card(
                    "Total Revenue",
                    &format_currency_rounded(metrics.total_revenue),
                    "Net of discounts",
                ))
                (metric_card(
                    "Average Service Value",
                    &format_currency_rounded(metrics.average_service_value),
                    "Per service",
                ))
                (metric_card(
                    "Services",
                    &metrics.total_services.to_string(),
                    &format!("{} this month", metrics.monthly_services),
                ))
                (metric_card(
                    "Customer Lifetime Value",
                    &format_currency_rounded(metrics.customer_lifetime_value),
                    "Average spend per customer",
                ))
                (metric_card(
                    "Repeat Business",
                    &format_percentage(metrics.repeat_business_rate),
                    "Vehicles serviced more than once",
                ))

                div class=(CARD_STYLE) aria-label="Average monthly growth"
                {
                    h4 class=(CARD_TITLE_STYLE) { "Monthly Growth" }
                    div class={(CARD_VALUE_STYLE) " " (growth_color_class(metrics.average_monthly_growth))}
                    {
                        (format_percentage(metrics.average_monthly_growth))
                    }
                    div class=(CARD_CAPTION_STYLE) { "Average over the last six months" }
                }

                (metric_card(
                    "Top Performer",
                    &metrics.top_performer.name,
                    &top_performer_caption,
                ))
            }
        }
    }
}

/// Renders the vehicle status counts and the outstanding follow-up calls.
pub(super) fn fleet_cards_view(fleet: &FleetStatus, follow_ups: &FollowUps) -> Markup {
    html! {
        section id="fleet" class="w-full mx-auto mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { "Fleet" }

            div class="grid grid-cols-2 lg:grid-cols-4 gap-4"
            {
                (metric_card("Vehicles", &fleet.total.to_string(), "Registered"))
                (metric_card("Active", &fleet.active.to_string(), "Not due yet"))
                (metric_card(
                    "Upcoming",
                    &fleet.upcoming.to_string(),
                    &format!("{} still to call", follow_ups.upcoming),
                ))
                (metric_card(
                    "Overdue",
                    &fleet.overdue.to_string(),
                    &format!("{} still to call", follow_ups.overdue),
                ))
            }
        }
    }
}
