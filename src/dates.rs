//! Calendar-day helpers.
//!
//! All task grouping keys are `YYYY-MM-DD` strings in local time, which
//! makes "is this date in the past" a plain lexicographic comparison.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Today's date as a `YYYY-MM-DD` string in local time.
pub fn today_string() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Whether a date string falls strictly before today.
pub fn is_past(date_string: &str) -> bool {
    date_string < today_string().as_str()
}

/// Human-readable label for a date: "Today", "Yesterday", or "Mon, Oct 25"
/// (with the year appended when it differs from the current one).
pub fn format_label(date_string: &str) -> String {
    label_for(date_string, Local::now().date_naive())
}

fn label_for(date_string: &str, today: NaiveDate) -> String {
    let date = match NaiveDate::parse_from_str(date_string, "%Y-%m-%d") {
        Ok(d) => d,
        // Unparseable keys come straight from stored data; show them as-is.
        Err(_) => return date_string.to_string(),
    };

    if date == today {
        return "Today".to_string();
    }
    if today - date == Duration::days(1) {
        return "Yesterday".to_string();
    }

    if date.year() == today.year() {
        date.format("%a, %b %-d").to_string()
    } else {
        date.format("%a, %b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date should parse")
    }

    #[test]
    fn test_today_string_shape() {
        let today = today_string();
        assert_eq!(today.len(), 10);
        assert!(!is_past(&today));
    }

    #[test]
    fn test_is_past() {
        assert!(is_past("2000-01-01"));
        assert!(!is_past("2999-12-31"));
    }

    #[test]
    fn test_label_today_and_yesterday() {
        let today = day("2024-03-15");
        assert_eq!(label_for("2024-03-15", today), "Today");
        assert_eq!(label_for("2024-03-14", today), "Yesterday");
    }

    #[test]
    fn test_label_same_year_omits_year() {
        let today = day("2024-03-15");
        assert_eq!(label_for("2024-01-08", today), "Mon, Jan 8");
    }

    #[test]
    fn test_label_other_year_includes_year() {
        let today = day("2024-03-15");
        assert_eq!(label_for("2023-10-24", today), "Tue, Oct 24, 2023");
    }

    #[test]
    fn test_label_unparseable_passthrough() {
        let today = day("2024-03-15");
        assert_eq!(label_for("not-a-date", today), "not-a-date");
    }
}
