use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// reporting window relative to a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    /// the reference date only
    Day,
    /// sunday through saturday containing the reference date
    Week,
    /// calendar month of the reference date
    Month,
    /// everything ever recorded
    Term,
}

impl Window {
    pub const ALL: [Window; 4] = [Window::Day, Window::Week, Window::Month, Window::Term];

    /// first and last date covered, `None` for the unbounded term window
    pub fn bounds(&self, reference: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Window::Day => Some((reference, reference)),
            Window::Week => {
                let start = week_start(reference);
                Some((start, start + Duration::days(6)))
            }
            Window::Month => {
                let start = reference.with_day(1)?;
                let next = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)?
                };
                Some((start, next - Duration::days(1)))
            }
            Window::Term => None,
        }
    }

    pub fn contains(&self, date: NaiveDate, reference: NaiveDate) -> bool {
        match self {
            Window::Day => date == reference,
            Window::Week => {
                let start = week_start(reference);
                date >= start && date <= start + Duration::days(6)
            }
            Window::Month => date.year() == reference.year() && date.month() == reference.month(),
            Window::Term => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Window::Day => "day",
            Window::Week => "week",
            Window::Month => "month",
            Window::Term => "term",
        }
    }
}

/// sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2024-03-01 is a friday
        assert_eq!(week_start(d(2024, 3, 1)), d(2024, 2, 25));
        // sunday maps to itself
        assert_eq!(week_start(d(2024, 2, 25)), d(2024, 2, 25));
        // saturday belongs to the preceding sunday
        assert_eq!(week_start(d(2024, 3, 2)), d(2024, 2, 25));
    }

    #[test]
    fn test_week_spans_month_boundary() {
        let reference = d(2024, 3, 1);
        assert!(Window::Week.contains(d(2024, 2, 26), reference));
        assert!(!Window::Month.contains(d(2024, 2, 26), reference));
        assert!(Window::Week.contains(d(2024, 3, 2), reference));
        assert!(!Window::Week.contains(d(2024, 3, 3), reference));
        assert!(!Window::Week.contains(d(2024, 2, 24), reference));
    }

    #[test]
    fn test_bounds() {
        let reference = d(2024, 2, 14);
        assert_eq!(Window::Day.bounds(reference), Some((reference, reference)));
        assert_eq!(Window::Week.bounds(reference), Some((d(2024, 2, 11), d(2024, 2, 17))));
        // leap february
        assert_eq!(Window::Month.bounds(reference), Some((d(2024, 2, 1), d(2024, 2, 29))));
        assert_eq!(Window::Month.bounds(d(2023, 12, 9)), Some((d(2023, 12, 1), d(2023, 12, 31))));
        assert_eq!(Window::Term.bounds(reference), None);
    }

    #[test]
    fn test_bounds_agree_with_contains() {
        let reference = d(2024, 12, 31);
        for window in [Window::Day, Window::Week, Window::Month] {
            let (start, end) = window.bounds(reference).unwrap();
            let mut date = start - Duration::days(3);
            while date <= end + Duration::days(3) {
                assert_eq!(window.contains(date, reference), date >= start && date <= end, "{:?} {}", window, date);
                date += Duration::days(1);
            }
        }
    }
}
