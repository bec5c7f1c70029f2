//! Mapping from queued notifications to outbound message content.

use crate::models::notification::{NotificationType, PendingNotification};
use crate::services::calendar::hebrew_day_name;
use crate::services::messaging::{ContentVariables, TemplateKind};

/// Default nudge body when the coordinator supplies none.
pub const DEFAULT_NUDGE_MESSAGE: &str = "אבא מחכה לביקור שלך!";

/// Fallback for a gap alert whose date payload is missing.
pub const UNKNOWN_DATE_MESSAGE: &str = "תאריך לא ידוע";

/// What the dispatcher should send for one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePlan {
    Template(TemplateKind, ContentVariables),
    Text(String),
}

/// Builds the message plan for a due notification.
///
/// Confirmation and reminder require the linked slot; without it the
/// notification cannot be rendered and the dispatcher records a failure.
pub fn plan(pending: &PendingNotification) -> Result<MessagePlan, String> {
    let notification = &pending.notification;
    match notification.notification_type {
        NotificationType::Confirmation => {
            let slot = pending
                .visit_slot
                .as_ref()
                .ok_or_else(|| "Confirmation has no linked slot".to_string())?;
            let name = pending
                .profile
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default();
            Ok(MessagePlan::Template(
                TemplateKind::VisitConfirmation,
                ContentVariables::new([
                    name,
                    format!("יום {}", hebrew_day_name(slot.date)),
                    slot.time_of_day.label().to_string(),
                ]),
            ))
        }
        NotificationType::Reminder => {
            let slot = pending
                .visit_slot
                .as_ref()
                .ok_or_else(|| "Reminder has no linked slot".to_string())?;
            Ok(MessagePlan::Template(
                TemplateKind::VisitReminder,
                ContentVariables::new([slot.time_of_day.label().to_string()]),
            ))
        }
        NotificationType::GapAlert => Ok(MessagePlan::Template(
            TemplateKind::GapAlert,
            ContentVariables::new([notification
                .message
                .clone()
                .unwrap_or_else(|| UNKNOWN_DATE_MESSAGE.to_string())]),
        )),
        // Nudges reuse the gap-alert template with a custom message.
        NotificationType::Nudge => Ok(MessagePlan::Template(
            TemplateKind::GapAlert,
            ContentVariables::new([notification
                .message
                .clone()
                .unwrap_or_else(|| DEFAULT_NUDGE_MESSAGE.to_string())]),
        )),
        // Invites carry their full text in the message field.
        NotificationType::Invite => notification
            .message
            .clone()
            .map(MessagePlan::Text)
            .ok_or_else(|| "Invite has no message body".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::{Notification, NotificationStatus};
    use crate::models::profile::{FamilyProfile, Relationship};
    use crate::models::visit_slot::{TimeOfDay, VisitSlot};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn pending(
        notification_type: NotificationType,
        message: Option<&str>,
        with_slot: bool,
    ) -> PendingNotification {
        let now = Utc::now();
        let profile = FamilyProfile {
            id: Uuid::new_v4(),
            phone: "+972501234567".to_string(),
            name: "יוסי".to_string(),
            hebrew_name: None,
            relationship: Relationship::Son,
            is_admin: false,
            last_visit_at: None,
            created_at: now,
            updated_at: now,
        };
        // 2025-03-09 is a Sunday
        let slot = VisitSlot {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            time_of_day: TimeOfDay::Morning,
            booked_by: Some(profile.id),
            booked_at: Some(now),
            notes: None,
            is_sabbath: false,
            is_holiday: false,
            holiday_name: None,
            created_at: now,
        };
        PendingNotification {
            notification: Notification {
                id: Uuid::new_v4(),
                profile_id: profile.id,
                notification_type,
                status: NotificationStatus::Pending,
                scheduled_for: now,
                sent_at: None,
                provider_message_id: None,
                visit_slot_id: with_slot.then(|| slot.id),
                message: message.map(|m| m.to_string()),
                error: None,
                created_at: now,
            },
            profile: Some(profile),
            visit_slot: with_slot.then_some(slot),
        }
    }

    #[test]
    fn test_confirmation_variables() {
        let p = pending(NotificationType::Confirmation, None, true);
        let plan = plan(&p).unwrap();
        match plan {
            MessagePlan::Template(TemplateKind::VisitConfirmation, vars) => {
                assert_eq!(vars.values(), ["יוסי", "יום ראשון", "בוקר"]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_confirmation_without_slot_fails() {
        let p = pending(NotificationType::Confirmation, None, false);
        assert!(plan(&p).is_err());
    }

    #[test]
    fn test_reminder_variables() {
        let p = pending(NotificationType::Reminder, None, true);
        match plan(&p).unwrap() {
            MessagePlan::Template(TemplateKind::VisitReminder, vars) => {
                assert_eq!(vars.values(), ["בוקר"]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_gap_alert_carries_date_message() {
        let p = pending(NotificationType::GapAlert, Some("יום שלישי 4/3"), false);
        match plan(&p).unwrap() {
            MessagePlan::Template(TemplateKind::GapAlert, vars) => {
                assert_eq!(vars.values(), ["יום שלישי 4/3"]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_gap_alert_fallback_message() {
        let p = pending(NotificationType::GapAlert, None, false);
        match plan(&p).unwrap() {
            MessagePlan::Template(TemplateKind::GapAlert, vars) => {
                assert_eq!(vars.values(), [UNKNOWN_DATE_MESSAGE]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_nudge_default_message() {
        let p = pending(NotificationType::Nudge, None, false);
        match plan(&p).unwrap() {
            MessagePlan::Template(TemplateKind::GapAlert, vars) => {
                assert_eq!(vars.values(), [DEFAULT_NUDGE_MESSAGE]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_invite_sends_plain_text() {
        let p = pending(NotificationType::Invite, Some("שלום רבקה!"), false);
        assert_eq!(
            plan(&p).unwrap(),
            MessagePlan::Text("שלום רבקה!".to_string())
        );
    }

    #[test]
    fn test_invite_without_body_fails() {
        let p = pending(NotificationType::Invite, None, false);
        assert!(plan(&p).is_err());
    }
}
