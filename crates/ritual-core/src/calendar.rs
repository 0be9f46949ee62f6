//! Calendar-day utilities.
//!
//! All streak logic operates on *local calendar days*, never on elapsed
//! 24-hour windows: a check-in at 23:59 and another at 00:01 the next
//! minute land on two different days.

use chrono::{DateTime, Local, NaiveDate};

/// The current local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The local calendar day a timestamp falls on.
pub fn start_of_day(ts: DateTime<Local>) -> NaiveDate {
    ts.date_naive()
}

/// True iff `date` is the given reference day.
pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

/// True iff `date` is exactly one calendar day before the reference day.
pub fn is_yesterday(date: NaiveDate, today: NaiveDate) -> bool {
    today.pred_opt().is_some_and(|yesterday| date == yesterday)
}

/// Absolute number of calendar-day boundaries crossed between two days.
pub fn day_distance(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}
