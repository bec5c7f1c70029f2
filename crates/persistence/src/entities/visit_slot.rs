//! Visit slot entities for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::profile::{FamilyProfile, Relationship};
use domain::models::visit_slot::{ScheduleSlot, TimeOfDay, VisitSlot};
use sqlx::FromRow;
use uuid::Uuid;

use super::decode_error;

/// Database entity for visit slots.
#[derive(Debug, Clone, FromRow)]
pub struct VisitSlotEntity {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_of_day: String,
    pub booked_by: Option<Uuid>,
    pub booked_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_sabbath: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<VisitSlotEntity> for VisitSlot {
    type Error = sqlx::Error;

    fn try_from(entity: VisitSlotEntity) -> Result<Self, Self::Error> {
        let time_of_day: TimeOfDay = entity.time_of_day.parse().map_err(decode_error)?;
        Ok(VisitSlot {
            id: entity.id,
            date: entity.date,
            time_of_day,
            booked_by: entity.booked_by,
            booked_at: entity.booked_at,
            notes: entity.notes,
            is_sabbath: entity.is_sabbath,
            is_holiday: entity.is_holiday,
            holiday_name: entity.holiday_name,
            created_at: entity.created_at,
        })
    }
}

/// A slot row left-joined with its booker's profile.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleSlotEntity {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_of_day: String,
    pub booked_by: Option<Uuid>,
    pub booked_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_sabbath: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub created_at: DateTime<Utc>,
    // Booker profile columns, all absent for unbooked slots.
    pub booker_id: Option<Uuid>,
    pub booker_phone: Option<String>,
    pub booker_name: Option<String>,
    pub booker_hebrew_name: Option<String>,
    pub booker_relationship: Option<String>,
    pub booker_is_admin: Option<bool>,
    pub booker_last_visit_at: Option<DateTime<Utc>>,
    pub booker_created_at: Option<DateTime<Utc>>,
    pub booker_updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ScheduleSlotEntity> for ScheduleSlot {
    type Error = sqlx::Error;

    fn try_from(entity: ScheduleSlotEntity) -> Result<Self, Self::Error> {
        let time_of_day: TimeOfDay = entity.time_of_day.parse().map_err(decode_error)?;

        let booked_by_profile = match (entity.booker_id, entity.booker_phone, entity.booker_name) {
            (Some(id), Some(phone), Some(name)) => {
                let relationship: Relationship = entity
                    .booker_relationship
                    .as_deref()
                    .unwrap_or_default()
                    .parse()
                    .map_err(decode_error)?;
                Some(FamilyProfile {
                    id,
                    phone,
                    name,
                    hebrew_name: entity.booker_hebrew_name,
                    relationship,
                    is_admin: entity.booker_is_admin.unwrap_or(false),
                    last_visit_at: entity.booker_last_visit_at,
                    created_at: entity.booker_created_at.unwrap_or(entity.created_at),
                    updated_at: entity.booker_updated_at.unwrap_or(entity.created_at),
                })
            }
            _ => None,
        };

        Ok(ScheduleSlot {
            slot: VisitSlot {
                id: entity.id,
                date: entity.date,
                time_of_day,
                booked_by: entity.booked_by,
                booked_at: entity.booked_at,
                notes: entity.notes,
                is_sabbath: entity.is_sabbath,
                is_holiday: entity.is_holiday,
                holiday_name: entity.holiday_name,
                created_at: entity.created_at,
            },
            booked_by_profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> VisitSlotEntity {
        VisitSlotEntity {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            time_of_day: "morning".to_string(),
            booked_by: None,
            booked_at: None,
            notes: None,
            is_sabbath: false,
            is_holiday: false,
            holiday_name: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let slot: VisitSlot = entity().try_into().expect("convert");
        assert_eq!(slot.time_of_day, TimeOfDay::Morning);
        assert!(!slot.is_booked());
    }

    #[test]
    fn test_bad_time_of_day_fails() {
        let mut e = entity();
        e.time_of_day = "night".to_string();
        assert!(VisitSlot::try_from(e).is_err());
    }

    #[test]
    fn test_schedule_entity_without_booker() {
        let now = Utc::now();
        let e = ScheduleSlotEntity {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            time_of_day: "evening".to_string(),
            booked_by: None,
            booked_at: None,
            notes: None,
            is_sabbath: false,
            is_holiday: false,
            holiday_name: None,
            created_at: now,
            booker_id: None,
            booker_phone: None,
            booker_name: None,
            booker_hebrew_name: None,
            booker_relationship: None,
            booker_is_admin: None,
            booker_last_visit_at: None,
            booker_created_at: None,
            booker_updated_at: None,
        };
        let schedule: ScheduleSlot = e.try_into().expect("convert");
        assert!(schedule.booked_by_profile.is_none());
    }

    #[test]
    fn test_schedule_entity_with_booker() {
        let now = Utc::now();
        let profile_id = Uuid::new_v4();
        let e = ScheduleSlotEntity {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            time_of_day: "evening".to_string(),
            booked_by: Some(profile_id),
            booked_at: Some(now),
            notes: Some("אביא עוגה".to_string()),
            is_sabbath: false,
            is_holiday: false,
            holiday_name: None,
            created_at: now,
            booker_id: Some(profile_id),
            booker_phone: Some("+972501234567".to_string()),
            booker_name: Some("רבקה".to_string()),
            booker_hebrew_name: None,
            booker_relationship: Some("בת".to_string()),
            booker_is_admin: Some(false),
            booker_last_visit_at: None,
            booker_created_at: Some(now),
            booker_updated_at: Some(now),
        };
        let schedule: ScheduleSlot = e.try_into().expect("convert");
        let booker = schedule.booked_by_profile.expect("booker present");
        assert_eq!(booker.id, profile_id);
        assert_eq!(booker.relationship, Relationship::Daughter);
    }
}
