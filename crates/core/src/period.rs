//! Calendar helpers shared by the ledger and the chart aggregations.

use chrono::{Datelike, Months, NaiveDate};

/// Short month labels, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// First and last day of a calendar month. `month` is 1-based.
#[must_use]
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, end))
}

/// `anchor` shifted by `n` months, clamped to the end of shorter months.
///
/// Always computed from the anchor so a Jan 31 anchor yields Feb 28/29 and
/// then Mar 31 again rather than drifting to the 28th.
#[must_use]
pub fn add_months(anchor: NaiveDate, n: u32) -> Option<NaiveDate> {
    anchor.checked_add_months(Months::new(n))
}

/// Zero-based month index of a date (January = 0).
#[must_use]
pub fn month_index(date: NaiveDate) -> usize {
    date.month0() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2024, 2), Some((d(2024, 2, 1), d(2024, 2, 29))));
        assert_eq!(month_bounds(2023, 12), Some((d(2023, 12, 1), d(2023, 12, 31))));
        assert_eq!(month_bounds(2023, 13), None);
    }

    #[test]
    fn test_add_months_clamps_without_drift() {
        let anchor = d(2024, 1, 31);
        assert_eq!(add_months(anchor, 1), Some(d(2024, 2, 29)));
        assert_eq!(add_months(anchor, 2), Some(d(2024, 3, 31)));
        assert_eq!(add_months(anchor, 13), Some(d(2025, 2, 28)));
    }

    #[test]
    fn test_month_index() {
        assert_eq!(month_index(d(2024, 3, 15)), 2);
        assert_eq!(MONTH_LABELS[month_index(d(2024, 3, 15))], "Mar");
    }
}
