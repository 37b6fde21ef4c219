//! Wall-clock access as an injected capability
//!
//! The weekly rollover and the daily log guard both depend on "today".
//! Keeping the clock behind a trait lets tests walk across day and week
//! boundaries deterministically instead of depending on real time.

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::Mutex;

/// Source of the current date and time
pub trait Clock: Send + Sync {
    /// The current calendar day at the user's local day boundary
    fn today(&self) -> NaiveDate;

    /// The current instant, for timestamps
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Jump to a specific date
    pub fn set(&self, date: NaiveDate) {
        *self.today.lock().unwrap() = date;
    }

    /// Move forward by whole days
    pub fn advance_days(&self, days: i64) {
        let mut today = self.today.lock().unwrap();
        *today += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }

    fn now(&self) -> DateTime<Utc> {
        self.today()
            .and_hms_opt(12, 0, 0)
            .expect("noon is always a valid time")
            .and_utc()
    }
}
