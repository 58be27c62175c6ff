//! Calendar helpers for monthly billing.
//!
//! Plain functions of the dates involved; callers decide what "today" is.

use chrono::{Datelike, Months, NaiveDate};

/// First and last day of `date`'s month.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// Due date for rent covering `date`'s month: the last day of the previous
/// month (rent is owed in advance).
pub fn rent_due_date(date: NaiveDate) -> NaiveDate {
    let (first, _) = month_bounds(date);
    first.pred_opt().unwrap_or(first)
}

/// Whole days between the due date and the payment date; zero when paid on
/// time or early.
pub fn days_late(due: NaiveDate, paid: NaiveDate) -> i64 {
    (paid - due).num_days().max(0)
}
