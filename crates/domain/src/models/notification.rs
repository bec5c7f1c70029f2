//! Notification queue models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::profile::FamilyProfile;
use super::visit_slot::VisitSlot;
use super::UnknownVariant;

/// Outbound message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Confirmation,
    Reminder,
    GapAlert,
    Nudge,
    Invite,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Confirmation => "confirmation",
            NotificationType::Reminder => "reminder",
            NotificationType::GapAlert => "gap_alert",
            NotificationType::Nudge => "nudge",
            NotificationType::Invite => "invite",
        }
    }
}

impl FromStr for NotificationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmation" => Ok(NotificationType::Confirmation),
            "reminder" => Ok(NotificationType::Reminder),
            "gap_alert" => Ok(NotificationType::GapAlert),
            "nudge" => Ok(NotificationType::Nudge),
            "invite" => Ok(NotificationType::Invite),
            other => Err(UnknownVariant::new("notification_type", other)),
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery lifecycle. A failed send stays failed until an operator
/// intervenes; there is no automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NotificationStatus::Pending),
            "sent" => Ok(NotificationStatus::Sent),
            "failed" => Ok(NotificationStatus::Failed),
            other => Err(UnknownVariant::new("notification_status", other)),
        }
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Notification {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    pub scheduled_for: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub provider_message_id: Option<String>,
    pub visit_slot_id: Option<Uuid>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A due notification enriched with its recipient and linked slot.
#[derive(Debug, Clone)]
pub struct PendingNotification {
    pub notification: Notification,
    pub profile: Option<FamilyProfile>,
    pub visit_slot: Option<VisitSlot>,
}

/// Counters accumulated over one dispatch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DispatchSummary {
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Request to send an ad hoc nudge to a family member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SendNudgeRequest {
    pub profile_id: Uuid,

    #[validate(length(max = 500, message = "message must be at most 500 characters"))]
    pub message: Option<String>,
}

/// Notification enriched with recipient profile for history views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationWithProfile {
    #[serde(flatten)]
    pub notification: Notification,
    pub profile: Option<FamilyProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_roundtrip() {
        for t in [
            NotificationType::Confirmation,
            NotificationType::Reminder,
            NotificationType::GapAlert,
            NotificationType::Nudge,
            NotificationType::Invite,
        ] {
            assert_eq!(t.as_str().parse::<NotificationType>().unwrap(), t);
        }
        assert!("sms".parse::<NotificationType>().is_err());
    }

    #[test]
    fn test_status_roundtrip() {
        for s in [
            NotificationStatus::Pending,
            NotificationStatus::Sent,
            NotificationStatus::Failed,
        ] {
            assert_eq!(s.as_str().parse::<NotificationStatus>().unwrap(), s);
        }
    }

    #[test]
    fn test_gap_alert_wire_name() {
        assert_eq!(
            serde_json::to_string(&NotificationType::GapAlert).unwrap(),
            "\"gap_alert\""
        );
    }

    #[test]
    fn test_dispatch_summary_default() {
        let summary = DispatchSummary::default();
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.failed, 0);
    }
}
