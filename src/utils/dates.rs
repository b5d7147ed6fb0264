//! Calendar helpers shared by the scanner, the renewal processor and reports.

use crate::error::{AppError, AppResult};
use chrono::{Datelike, Local, Months, NaiveDate};

/// Gym-local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Adds calendar months. Days past the end of the target month are clamped
/// to its last day (2024-01-31 + 1 month = 2024-02-29).
pub fn add_months(date: NaiveDate, months: u32) -> AppResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| AppError::ValidationError(format!("Date out of range: {date} + {months} months")))
}

/// Whole days elapsed since `end_date`, never negative.
pub fn days_expired(end_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - end_date).num_days().max(0)
}

/// Approximated debt: one `cost` per started 30-day block since expiry,
/// saturating at `i64::MAX`.
pub fn approximate_debt(cost: i64, days_expired: i64) -> i64 {
    if days_expired <= 0 {
        return 0;
    }
    cost.saturating_mul((days_expired + 29) / 30)
}

/// `YYYY-MM` key used for monthly markers and report selection.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Parses `YYYY-MM` into the first and last day of that month.
pub fn month_bounds(month: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError(format!("Invalid month {month}, expected YYYY-MM")))?;
    let last = add_months(first, 1)?
        .pred_opt()
        .ok_or_else(|| AppError::ValidationError(format!("Invalid month {month}")))?;
    Ok((first, last))
}

pub fn day_of_month(date: NaiveDate) -> i32 {
    date.day() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(d("2024-01-31"), 1).unwrap(), d("2024-02-29"));
        assert_eq!(add_months(d("2023-01-31"), 1).unwrap(), d("2023-02-28"));
        assert_eq!(add_months(d("2024-02-15"), 1).unwrap(), d("2024-03-15"));
        assert_eq!(add_months(d("2024-11-30"), 3).unwrap(), d("2025-02-28"));
    }

    #[test]
    fn test_days_expired_and_debt() {
        let days = days_expired(d("2024-01-01"), d("2024-02-15"));
        assert_eq!(days, 45);
        assert_eq!(approximate_debt(1000, days), 2000);

        assert_eq!(approximate_debt(1000, 30), 1000);
        assert_eq!(approximate_debt(1000, 31), 2000);
        assert_eq!(approximate_debt(1000, 1), 1000);
    }

    #[test]
    fn test_days_expired_never_negative() {
        assert_eq!(days_expired(d("2024-03-01"), d("2024-02-15")), 0);
        assert_eq!(approximate_debt(1000, 0), 0);
    }

    #[test]
    fn test_debt_saturates_instead_of_overflowing() {
        assert_eq!(approximate_debt(i64::MAX, 45), i64::MAX);
        assert_eq!(approximate_debt(i64::MAX / 2, 31), i64::MAX - 1);
    }

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds("2024-02").unwrap();
        assert_eq!(first, d("2024-02-01"));
        assert_eq!(last, d("2024-02-29"));
        assert_eq!(month_key(d("2024-12-09")), "2024-12");
        assert!(month_bounds("2024-13").is_err());
        assert!(month_bounds("feb").is_err());
    }
}
