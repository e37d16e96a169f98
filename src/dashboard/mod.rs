//! Dashboard module
//!
//! Provides an overview page with metric cards, charts and tables for the
//! selected time window and technician, and the same summary as JSON.

mod cards;
mod charts;
mod handlers;
mod tables;

pub use handlers::{get_dashboard_page, get_dashboard_summary_endpoint};
