//! Half-open time windows over local wall-clock time.
//!
//! Every range query uses `[start, end)` so a record stamped exactly at
//! midnight belongs to the day it opens, never to the day before.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// `[start, end)` interval
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// The calendar day `[midnight, next midnight)`
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        Self::new(start, start + Duration::days(1))
    }

    /// The calendar day containing `now`
    pub fn today(now: NaiveDateTime) -> Self {
        Self::day(now.date())
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// One window per calendar day for the `days` days ending with the day of
/// `now`, oldest first.
pub fn trailing_days(now: NaiveDateTime, days: u32) -> Vec<TimeWindow> {
    let today = now.date();
    (0..i64::from(days))
        .rev()
        .map(|offset| TimeWindow::day(today - Duration::days(offset)))
        .collect()
}
