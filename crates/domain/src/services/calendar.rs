//! Calendar rules: the Sabbath-blocked window and Hebrew date labels.
//!
//! Weekday computation works on the bare ISO date, so the result is the same
//! on every server regardless of local timezone.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::visit_slot::TimeOfDay;

/// Hebrew weekday names, Sunday first.
pub const DAY_NAMES: [&str; 7] = [
    "ראשון",
    "שני",
    "שלישי",
    "רביעי",
    "חמישי",
    "שישי",
    "שבת",
];

/// Sabbath/holiday facts for a single date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayFlags {
    pub is_sabbath: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
}

/// Black-box supplier of Sabbath/holiday facts for a date.
///
/// The real Hebrew-calendar computation lives outside this system; the
/// default implementation derives the Sabbath from the weekday and reports
/// no holidays.
pub trait HebrewCalendar: Send + Sync {
    fn day_flags(&self, date: NaiveDate) -> DayFlags;
}

/// Weekday-only calendar: Saturday is the Sabbath, holidays are unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekdayCalendar;

impl HebrewCalendar for WeekdayCalendar {
    fn day_flags(&self, date: NaiveDate) -> DayFlags {
        DayFlags {
            is_sabbath: date.weekday() == Weekday::Sat,
            is_holiday: false,
            holiday_name: None,
        }
    }
}

/// Whether a (date, time-of-day) pair falls inside the Sabbath-blocked
/// window: the evening before the Sabbath, or any window on the Sabbath
/// day itself.
pub fn is_blocked(date: NaiveDate, time_of_day: TimeOfDay) -> bool {
    match date.weekday() {
        Weekday::Fri => time_of_day == TimeOfDay::Evening,
        Weekday::Sat => true,
        _ => false,
    }
}

/// Whether a whole date sits inside the blocked window for scheduling
/// purposes. The gap scan skips Fridays as well as Saturdays: the only
/// bookable Friday window that matters for coverage is already counted as
/// part of the preceding week.
pub fn is_blocked_date(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Fri | Weekday::Sat)
}

/// Hebrew name of a date's weekday.
pub fn hebrew_day_name(date: NaiveDate) -> &'static str {
    DAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// Formats a date for Hebrew display, e.g. `יום שלישי 4/3`.
pub fn format_hebrew_date(date: NaiveDate) -> String {
    format!("יום {} {}/{}", hebrew_day_name(date), date.day(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-03-07 is a Friday, 2025-03-08 a Saturday.
    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    #[test]
    fn test_friday_evening_is_blocked() {
        assert!(is_blocked(friday(), TimeOfDay::Evening));
    }

    #[test]
    fn test_friday_daytime_is_open() {
        assert!(!is_blocked(friday(), TimeOfDay::Morning));
        assert!(!is_blocked(friday(), TimeOfDay::Afternoon));
    }

    #[test]
    fn test_all_saturday_windows_blocked() {
        for t in TimeOfDay::ALL {
            assert!(is_blocked(saturday(), t));
        }
    }

    #[test]
    fn test_weekdays_open() {
        for t in TimeOfDay::ALL {
            assert!(!is_blocked(sunday(), t));
        }
    }

    #[test]
    fn test_blocked_dates() {
        assert!(is_blocked_date(friday()));
        assert!(is_blocked_date(saturday()));
        assert!(!is_blocked_date(sunday()));
    }

    #[test]
    fn test_weekday_calendar_flags() {
        let cal = WeekdayCalendar;
        assert!(cal.day_flags(saturday()).is_sabbath);
        assert!(!cal.day_flags(friday()).is_sabbath);
        assert!(!cal.day_flags(sunday()).is_holiday);
    }

    #[test]
    fn test_hebrew_day_names() {
        assert_eq!(hebrew_day_name(sunday()), "ראשון");
        assert_eq!(hebrew_day_name(saturday()), "שבת");
    }

    #[test]
    fn test_format_hebrew_date() {
        assert_eq!(format_hebrew_date(sunday()), "יום ראשון 9/3");
    }
}
