//! Table views for dashboard data display.
//!
//! Provides HTML table components for the service type breakdown and the
//! technician leaderboard.

use maud::{Markup, html};

use crate::{
    analytics::{ServiceTypeCount, TechnicianTotals},
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
};

const TABLE_STYLE: &str = "w-full text-sm text-left text-gray-500 dark:text-gray-400";
const TABLE_NAME_CELL_STYLE: &str = "px-6 py-4 font-medium text-gray-900 dark:text-white";

/// Renders the number of services of each type with their share of the total.
pub(super) fn service_types_table(distribution: &[ServiceTypeCount]) -> Markup {
    let total: usize = distribution
        .iter()
        .map(|service_type| service_type.count)
        .sum();

    html! {
        div {
            h3 class="text-xl font-semibold mb-4" { "Top Services" }

            div class="overflow-x-auto rounded-lg shadow" {
                table id="service-types-table" class=(TABLE_STYLE) {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Service" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Count" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                        }
                    }
                    tbody {
                        @for service_type in distribution {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class=(TABLE_NAME_CELL_STYLE) {
                                    span
                                        class="inline-block w-3 h-3 mr-2 rounded-full"
                                        style=(format!("background-color: {}", service_type.color))
                                    {}
                                    (service_type.service_type)
                                }
                                td class=(TABLE_CELL_STYLE) { (service_type.count) }
                                td class=(TABLE_CELL_STYLE) {
                                    (format!("{:.0}%", share(service_type.count, total)))
                                }
                            }
                        }

                        @if distribution.is_empty() {
                            tr class=(TABLE_ROW_STYLE) {
                                td colspan="3" class={(TABLE_CELL_STYLE) " text-center"} {
                                    "No services in this period"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    count as f64 / total as f64 * 100.0
}

/// Renders each technician's service count and revenue, in the order given.
pub(super) fn technician_table(technicians: &[TechnicianTotals]) -> Markup {
    html! {
        div {
            h3 class="text-xl font-semibold mb-4" { "Technicians" }

            div class="overflow-x-auto rounded-lg shadow" {
                table id="technicians-table" class=(TABLE_STYLE) {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Technician" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Services" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Net Revenue" }
                        }
                    }
                    tbody {
                        @for technician in technicians {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class=(TABLE_NAME_CELL_STYLE) { (technician.name) }
                                td class=(TABLE_CELL_STYLE) { (technician.services) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(technician.net_value)) }
                            }
                        }

                        @if technicians.is_empty() {
                            tr class=(TABLE_ROW_STYLE) {
                                td colspan="3" class={(TABLE_CELL_STYLE) " text-center"} {
                                    "No technician data in this period"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::analytics::{SERVICE_TYPE_PALETTE, ServiceTypeCount, TechnicianTotals};

    use super::{service_types_table, technician_table};

    fn row_texts(html: &Html) -> Vec<Vec<String>> {
        let row_selector = Selector::parse("tbody tr").unwrap();
        let cell_selector = Selector::parse("th, td").unwrap();

        html.select(&row_selector)
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn service_types_show_share_of_total() {
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

        let html = Html::parse_fragment(&service_types_table(&distribution).into_string());

        assert_eq!(
            row_texts(&html),
            vec![
                vec!["Oil Change", "3", "75%"],
                vec!["Tyre Rotation", "1", "25%"],
            ]
        );
    }

    #[test]
    fn empty_tables_show_placeholder_row() {
        let html = Html::parse_fragment(&technician_table(&[]).into_string());

        assert_eq!(
            row_texts(&html),
            vec![vec!["No technician data in this period"]]
        );
    }

    #[test]
    fn technicians_keep_given_order() {
        let technicians = vec![
            TechnicianTotals {
                name: "Carol".to_owned(),
                services: 1,
                parts: 0.0,
                labor: 0.0,
                discount: 0.0,
                net_value: 0.0,
            },
            TechnicianTotals {
                name: "Bob".to_owned(),
                services: 2,
                parts: 0.0,
                labor: 0.0,
                discount: 0.0,
                net_value: 0.0,
            },
        ];

        let html = Html::parse_fragment(&technician_table(&technicians).into_string());

        let names: Vec<String> = row_texts(&html).into_iter().map(|row| row[0].clone()).collect();
        assert_eq!(names, ["Carol", "Bob"]);
    }
}
