//! Time-window and technician filters applied before aggregation.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

use crate::service_record::ServiceRecord;

/// A trailing range of time ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    #[default]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl TimeWindow {
    /// All windows in the order they are shown to the user.
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::Week,
        TimeWindow::Month,
        TimeWindow::Quarter,
        TimeWindow::Year,
        TimeWindow::All,
    ];

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::Year => "1y",
            Self::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Week => "Last 7 days",
            Self::Month => "Last 30 days",
            Self::Quarter => "Last 90 days",
            Self::Year => "Last year",
            Self::All => "All time",
        }
    }

    /// The first date included in the window, or `None` for [TimeWindow::All].
    ///
    /// The 30 and 90 day windows subtract calendar months and the one year
    /// window subtracts a calendar year, see [subtract_months].
    pub fn start_date(self, today: Date) -> Option<Date> {
        match self {
            Self::Week => Some(today - Duration::days(7)),
            Self::Month => Some(subtract_months(today, 1)),
            Self::Quarter => Some(subtract_months(today, 3)),
            Self::Year => Some(subtract_months(today, 12)),
            Self::All => None,
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeWindow::ALL
            .into_iter()
            .find(|window| window.as_query_value() == s)
            .ok_or_else(|| format!("unknown time window \"{s}\""))
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query_value())
    }
}

/// Subtract calendar months from `date`, keeping the day of the month.
///
/// When the target month is shorter than the day of the month, the date
/// overflows into the following month, e.g. 31 March minus one month is
/// 2 March in a leap year.
pub fn subtract_months(date: Date, months: u32) -> Date {
    let total_months = date.year() * 12 + (u8::from(date.month()) as i32 - 1) - months as i32;
    let year = total_months.div_euclid(12);
    let month =
        Month::try_from((total_months.rem_euclid(12) + 1) as u8).unwrap_or(Month::January);

    // The first of any month in the supported range is always a valid date.
    let Ok(first_of_month) = Date::from_calendar_date(year, month, 1) else {
        return Date::MIN;
    };

    first_of_month + Duration::days(date.day() as i64 - 1)
}

/// Keep the records dated on or after the start of `window`.
pub fn filter_by_window(
    records: &[ServiceRecord],
    window: TimeWindow,
    today: Date,
) -> Vec<ServiceRecord> {
    match window.start_date(today) {
        Some(start_date) => records
            .iter()
            .filter(|record| record.date >= start_date)
            .cloned()
            .collect(),
        None => records.to_vec(),
    }
}

/// Keep the records dated in the given calendar month.
pub fn filter_by_month(records: &[ServiceRecord], year: i32, month: Month) -> Vec<ServiceRecord> {
    records
        .iter()
        .filter(|record| is_in_month(record.date, year, month))
        .cloned()
        .collect()
}

pub(crate) fn is_in_month(date: Date, year: i32, month: Month) -> bool {
    date.year() == year && date.month() == month
}

/// Selects records by the technician who performed them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TechnicianFilter {
    /// Keep all records, including those without a technician.
    #[default]
    All,
    /// Keep the records performed by the named technician.
    Named(String),
}

impl TechnicianFilter {
    /// The value used for [TechnicianFilter::All] in query strings.
    pub const ALL_QUERY_VALUE: &'static str = "all";

    /// Parse a query string value. A missing, blank or "all" value means all technicians.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(Self::ALL_QUERY_VALUE) => Self::All,
            Some(name) => Self::Named(name.to_owned()),
        }
    }

    pub fn as_query_value(&self) -> &str {
        match self {
            Self::All => Self::ALL_QUERY_VALUE,
            Self::Named(name) => name,
        }
    }

    pub fn matches(&self, record: &ServiceRecord) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => record.technician_name() == Some(name.as_str()),
        }
    }
}

/// Keep the records that match `filter`.
///
/// Records without a technician only survive [TechnicianFilter::All].
pub fn filter_by_technician(
    records: &[ServiceRecord],
    filter: &TechnicianFilter,
) -> Vec<ServiceRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}
