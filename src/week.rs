//! Date arithmetic for the displayed week
//!
//! A displayed week is a Monday-anchored 7-day window, represented by its start date.
//! Every function here is pure; callers thread the week they are rendering through explicitly.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Returns the Monday at or before `date`.
///
/// Idempotent: `start_of_week(start_of_week(d)) == start_of_week(d)`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Calendar-correct day arithmetic, including month and year rollover
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

/// The weekday index used for grid columns: 0 = Monday .. 6 = Sunday
pub fn day_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// The seven days of the week starting at `week_start`
pub fn days_of_week(week_start: NaiveDate) -> [NaiveDate; 7] {
    let mut days = [week_start; 7];
    for (offset, day) in days.iter_mut().enumerate() {
        *day = add_days(week_start, offset as i64);
    }
    days
}

/// Formats a date as ISO "YYYY-MM-DD"
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses an ISO "YYYY-MM-DD" date. Returns `None` on malformed input rather than failing loudly,
/// so callers can skip bad records.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Number of whole weeks between two week-start dates.
///
/// Negative when `to_week_start` is before `from_week_start`. Recurrence rules use this to test
/// alignment (e.g. "is this week an even number of weeks away from the anchor week").
pub fn week_index(from_week_start: NaiveDate, to_week_start: NaiveDate) -> i64 {
    (to_week_start - from_week_start).num_days().div_euclid(7)
}

/// Moves a displayed week forward or backward by whole weeks.
/// Navigation never shifts partially: the result is always a Monday.
pub fn shift_weeks(week_start: NaiveDate, weeks: i64) -> NaiveDate {
    add_days(start_of_week(week_start), weeks * 7)
}

/// The start of the week containing today, for first-load navigation state
pub fn current_week_start() -> NaiveDate {
    start_of_week(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn start_of_week_returns_the_monday_at_or_before() {
        // 2024-03-04 is a Monday
        assert_eq!(start_of_week(date(2024, 3, 4)), date(2024, 3, 4));
        assert_eq!(start_of_week(date(2024, 3, 7)), date(2024, 3, 4));
        assert_eq!(start_of_week(date(2024, 3, 10)), date(2024, 3, 4));
    }

    #[test]
    fn start_of_week_is_idempotent() {
        let d = date(2024, 3, 9);
        assert_eq!(start_of_week(start_of_week(d)), start_of_week(d));
    }

    #[test]
    fn add_days_rolls_over_months_and_years() {
        assert_eq!(add_days(date(2024, 2, 28), 2), date(2024, 3, 1)); // leap year
        assert_eq!(add_days(date(2023, 12, 31), 1), date(2024, 1, 1));
        assert_eq!(add_days(date(2024, 3, 1), -1), date(2024, 2, 29));
    }

    #[test]
    fn iso_round_trip() {
        let d = date(2024, 3, 4);
        assert_eq!(parse_iso_date(&to_iso_date(d)), Some(d));
    }

    #[test]
    fn parse_iso_date_rejects_malformed_input() {
        assert_eq!(parse_iso_date(""), None);
        assert_eq!(parse_iso_date("not-a-date"), None);
        assert_eq!(parse_iso_date("2024-13-01"), None);
    }

    #[test]
    fn week_index_counts_whole_weeks() {
        let monday = date(2024, 3, 4);
        assert_eq!(week_index(monday, monday), 0);
        assert_eq!(week_index(monday, add_days(monday, 7)), 1);
        assert_eq!(week_index(monday, add_days(monday, 14)), 2);
        assert_eq!(week_index(monday, add_days(monday, -7)), -1);
    }

    #[test]
    fn shift_weeks_always_lands_on_a_monday() {
        let thursday = date(2024, 3, 7);
        assert_eq!(shift_weeks(thursday, 1), date(2024, 3, 11));
        assert_eq!(shift_weeks(thursday, -1), date(2024, 2, 26));
        assert_eq!(shift_weeks(thursday, 0), date(2024, 3, 4));
    }

    #[test]
    fn days_of_week_spans_monday_to_sunday() {
        let days = days_of_week(date(2024, 3, 4));
        assert_eq!(days[0], date(2024, 3, 4));
        assert_eq!(days[6], date(2024, 3, 10));
        assert_eq!(day_index(days[0]), 0);
        assert_eq!(day_index(days[6]), 6);
    }
}
