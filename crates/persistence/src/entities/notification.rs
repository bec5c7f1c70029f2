//! Notification entities for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::notification::{
    Notification, NotificationStatus, NotificationType, NotificationWithProfile,
    PendingNotification,
};
use domain::models::profile::{FamilyProfile, Relationship};
use domain::models::visit_slot::{TimeOfDay, VisitSlot};
use sqlx::FromRow;
use uuid::Uuid;

use super::decode_error;

/// Database entity for notifications.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub notification_type: String,
    pub status: String,
    pub scheduled_for: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub provider_message_id: Option<String>,
    pub visit_slot_id: Option<Uuid>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationEntity> for Notification {
    type Error = sqlx::Error;

    fn try_from(entity: NotificationEntity) -> Result<Self, Self::Error> {
        let notification_type: NotificationType =
            entity.notification_type.parse().map_err(decode_error)?;
        let status: NotificationStatus = entity.status.parse().map_err(decode_error)?;
        Ok(Notification {
            id: entity.id,
            profile_id: entity.profile_id,
            notification_type,
            status,
            scheduled_for: entity.scheduled_for,
            sent_at: entity.sent_at,
            provider_message_id: entity.provider_message_id,
            visit_slot_id: entity.visit_slot_id,
            message: entity.message,
            error: entity.error,
            created_at: entity.created_at,
        })
    }
}

/// A due notification row left-joined with its recipient and linked slot.
#[derive(Debug, Clone, FromRow)]
pub struct PendingNotificationEntity {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub notification_type: String,
    pub status: String,
    pub scheduled_for: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub provider_message_id: Option<String>,
    pub visit_slot_id: Option<Uuid>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    // Recipient profile columns.
    pub recipient_phone: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_hebrew_name: Option<String>,
    pub recipient_relationship: Option<String>,
    pub recipient_is_admin: Option<bool>,
    pub recipient_last_visit_at: Option<DateTime<Utc>>,
    pub recipient_created_at: Option<DateTime<Utc>>,
    pub recipient_updated_at: Option<DateTime<Utc>>,
    // Linked slot columns.
    pub slot_date: Option<NaiveDate>,
    pub slot_time_of_day: Option<String>,
    pub slot_booked_by: Option<Uuid>,
    pub slot_booked_at: Option<DateTime<Utc>>,
    pub slot_notes: Option<String>,
    pub slot_is_sabbath: Option<bool>,
    pub slot_is_holiday: Option<bool>,
    pub slot_holiday_name: Option<String>,
    pub slot_created_at: Option<DateTime<Utc>>,
}

impl PendingNotificationEntity {
    fn recipient(&self) -> Result<Option<FamilyProfile>, sqlx::Error> {
        match (&self.recipient_phone, &self.recipient_name) {
            (Some(phone), Some(name)) => {
                let relationship: Relationship = self
                    .recipient_relationship
                    .as_deref()
                    .unwrap_or_default()
                    .parse()
                    .map_err(decode_error)?;
                Ok(Some(FamilyProfile {
                    id: self.profile_id,
                    phone: phone.clone(),
                    name: name.clone(),
                    hebrew_name: self.recipient_hebrew_name.clone(),
                    relationship,
                    is_admin: self.recipient_is_admin.unwrap_or(false),
                    last_visit_at: self.recipient_last_visit_at,
                    created_at: self.recipient_created_at.unwrap_or(self.created_at),
                    updated_at: self.recipient_updated_at.unwrap_or(self.created_at),
                }))
            }
            _ => Ok(None),
        }
    }

    fn linked_slot(&self) -> Result<Option<VisitSlot>, sqlx::Error> {
        match (self.visit_slot_id, self.slot_date, &self.slot_time_of_day) {
            (Some(id), Some(date), Some(time_of_day)) => {
                let time_of_day: TimeOfDay = time_of_day.parse().map_err(decode_error)?;
                Ok(Some(VisitSlot {
                    id,
                    date,
                    time_of_day,
                    booked_by: self.slot_booked_by,
                    booked_at: self.slot_booked_at,
                    notes: self.slot_notes.clone(),
                    is_sabbath: self.slot_is_sabbath.unwrap_or(false),
                    is_holiday: self.slot_is_holiday.unwrap_or(false),
                    holiday_name: self.slot_holiday_name.clone(),
                    created_at: self.slot_created_at.unwrap_or(self.created_at),
                }))
            }
            _ => Ok(None),
        }
    }
}

impl TryFrom<PendingNotificationEntity> for PendingNotification {
    type Error = sqlx::Error;

    fn try_from(entity: PendingNotificationEntity) -> Result<Self, Self::Error> {
        let profile = entity.recipient()?;
        let visit_slot = entity.linked_slot()?;
        let notification = Notification {
            id: entity.id,
            profile_id: entity.profile_id,
            notification_type: entity.notification_type.parse().map_err(decode_error)?,
            status: entity.status.parse().map_err(decode_error)?,
            scheduled_for: entity.scheduled_for,
            sent_at: entity.sent_at,
            provider_message_id: entity.provider_message_id,
            visit_slot_id: entity.visit_slot_id,
            message: entity.message,
            error: entity.error,
            created_at: entity.created_at,
        };
        Ok(PendingNotification {
            notification,
            profile,
            visit_slot,
        })
    }
}

impl TryFrom<PendingNotificationEntity> for NotificationWithProfile {
    type Error = sqlx::Error;

    fn try_from(entity: PendingNotificationEntity) -> Result<Self, Self::Error> {
        let pending: PendingNotification = entity.try_into()?;
        Ok(NotificationWithProfile {
            notification: pending.notification,
            profile: pending.profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> PendingNotificationEntity {
        let now = Utc::now();
        PendingNotificationEntity {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            notification_type: "confirmation".to_string(),
            status: "pending".to_string(),
            scheduled_for: now,
            sent_at: None,
            provider_message_id: None,
            visit_slot_id: Some(Uuid::new_v4()),
            message: None,
            error: None,
            created_at: now,
            recipient_phone: Some("+972501234567".to_string()),
            recipient_name: Some("יוסי".to_string()),
            recipient_hebrew_name: None,
            recipient_relationship: Some("בן".to_string()),
            recipient_is_admin: Some(false),
            recipient_last_visit_at: None,
            recipient_created_at: Some(now),
            recipient_updated_at: Some(now),
            slot_date: Some(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()),
            slot_time_of_day: Some("morning".to_string()),
            slot_booked_by: None,
            slot_booked_at: None,
            slot_notes: None,
            slot_is_sabbath: Some(false),
            slot_is_holiday: Some(false),
            slot_holiday_name: None,
            slot_created_at: Some(now),
        }
    }

    #[test]
    fn test_pending_entity_to_domain() {
        let pending: PendingNotification = entity().try_into().expect("convert");
        assert_eq!(
            pending.notification.notification_type,
            NotificationType::Confirmation
        );
        assert_eq!(pending.notification.status, NotificationStatus::Pending);
        assert!(pending.profile.is_some());
        assert!(pending.visit_slot.is_some());
    }

    #[test]
    fn test_pending_entity_without_joins() {
        let mut e = entity();
        e.recipient_phone = None;
        e.recipient_name = None;
        e.visit_slot_id = None;
        e.slot_date = None;
        e.slot_time_of_day = None;
        let pending: PendingNotification = e.try_into().expect("convert");
        assert!(pending.profile.is_none());
        assert!(pending.visit_slot.is_none());
    }

    #[test]
    fn test_bad_type_fails() {
        let mut e = entity();
        e.notification_type = "sms".to_string();
        assert!(PendingNotification::try_from(e).is_err());
    }
}
