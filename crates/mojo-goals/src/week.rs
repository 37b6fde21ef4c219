//! Week boundary math
//!
//! Weeks start Monday 00:00 local time. The offset-to-Monday formula below
//! (Sunday counts as day 0 and maps back six days) matches the data already
//! stored by deployed clients, so it must not be "simplified".

use chrono::{Datelike, Duration, NaiveDate};

/// The Monday that begins the week containing `date`
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let day_of_week = date.weekday().num_days_from_sunday() as i64;
    let diff = if day_of_week == 0 { -6 } else { 1 - day_of_week };
    date + Duration::days(diff)
}
