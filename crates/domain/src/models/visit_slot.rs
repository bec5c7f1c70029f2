//! Visit slot models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::profile::FamilyProfile;
use super::UnknownVariant;

/// The three fixed daily visit windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 3] = [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening];

    /// Storage value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }

    /// Hebrew label used in outbound messages.
    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "בוקר",
            TimeOfDay::Afternoon => "צהריים",
            TimeOfDay::Evening => "ערב",
        }
    }

    /// Clock hour at which the visit window starts, used only to compute
    /// the 24-hours-before reminder instant.
    pub fn start_hour(&self) -> u32 {
        match self {
            TimeOfDay::Morning => 7,
            TimeOfDay::Afternoon => 12,
            TimeOfDay::Evening => 16,
        }
    }

    /// The UTC instant at which a visit in this window starts on a date.
    pub fn start_instant(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(self.start_hour(), 0, 0)
            .expect("start hour is a valid time")
            .and_utc()
    }
}

impl FromStr for TimeOfDay {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeOfDay::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("time_of_day", s))
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar cell: a (date, time-of-day) bookable unit.
///
/// Rows persist after cancellation with the booking fields cleared, keeping
/// an audit trail of the cell itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VisitSlot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
    pub booked_by: Option<Uuid>,
    pub booked_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_sabbath: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VisitSlot {
    /// Whether the cell currently carries an active booking.
    pub fn is_booked(&self) -> bool {
        self.booked_by.is_some()
    }
}

/// Request to book a visit slot.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct BookSlotRequest {
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,

    #[validate(length(max = 500, message = "notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Request for a coordinator to book on behalf of a family member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct BookForMemberRequest {
    pub profile_id: Uuid,
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,

    #[validate(length(max = 500, message = "notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// A slot enriched with the booker's profile for schedule views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScheduleSlot {
    #[serde(flatten)]
    pub slot: VisitSlot,
    pub booked_by_profile: Option<FamilyProfile>,
}

/// Day-by-day coverage entry for the coordinator gap view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DayCoverage {
    pub date: NaiveDate,
    pub display_date: String,
    pub is_sabbath: bool,
    pub is_gap: bool,
    /// Booked slot count, absent on Sabbath days.
    pub coverage: Option<usize>,
    pub morning: Option<ScheduleSlot>,
    pub afternoon: Option<ScheduleSlot>,
    pub evening: Option<ScheduleSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_roundtrip() {
        for t in TimeOfDay::ALL {
            assert_eq!(t.as_str().parse::<TimeOfDay>().unwrap(), t);
        }
        assert!("night".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_start_hours() {
        assert_eq!(TimeOfDay::Morning.start_hour(), 7);
        assert_eq!(TimeOfDay::Afternoon.start_hour(), 12);
        assert_eq!(TimeOfDay::Evening.start_hour(), 16);
    }

    #[test]
    fn test_start_instant() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let start = TimeOfDay::Evening.start_instant(date);
        assert_eq!(start.to_rfc3339(), "2025-03-12T16:00:00+00:00");
    }

    #[test]
    fn test_labels_are_hebrew() {
        assert_eq!(TimeOfDay::Morning.label(), "בוקר");
        assert_eq!(TimeOfDay::Afternoon.label(), "צהריים");
        assert_eq!(TimeOfDay::Evening.label(), "ערב");
    }

    #[test]
    fn test_is_booked() {
        let now = Utc::now();
        let mut slot = VisitSlot {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            time_of_day: TimeOfDay::Morning,
            booked_by: None,
            booked_at: None,
            notes: None,
            is_sabbath: false,
            is_holiday: false,
            holiday_name: None,
            created_at: now,
        };
        assert!(!slot.is_booked());
        slot.booked_by = Some(Uuid::new_v4());
        assert!(slot.is_booked());
    }
}
