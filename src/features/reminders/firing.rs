//! Firing window evaluation

use chrono::NaiveDate;

/// Day differences (due date minus today) on which a reminder fires
pub const FIRING_WINDOW: [i64; 3] = [2, 1, 0];

pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

pub fn is_firing(due: NaiveDate, today: NaiveDate) -> bool {
    FIRING_WINDOW.contains(&days_until(due, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_edges() {
        let today = NaiveDate::from_ymd_opt(1404, 8, 5).unwrap();

        assert!(is_firing(today + Duration::days(2), today));
        assert!(is_firing(today + Duration::days(1), today));
        assert!(is_firing(today, today));

        assert!(!is_firing(today + Duration::days(3), today));
        assert!(!is_firing(today - Duration::days(1), today));
    }

    #[test]
    fn test_window_across_month_and_year() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 30).unwrap();
        assert!(is_firing(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), today));
        assert!(!is_firing(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(), today));
        assert_eq!(days_until(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(), today), 3);
    }
}
