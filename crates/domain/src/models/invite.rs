//! Invite models.
//!
//! An invite is the capability for a specific phone/name/relationship to
//! join the family. It is consumed (status `accepted`) when the matching
//! profile is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::profile::Relationship;
use super::UnknownVariant;

/// Invite delivery/consumption lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Sent,
    Accepted,
    Failed,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Sent => "sent",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Failed => "failed",
        }
    }
}

impl FromStr for InviteStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InviteStatus::Pending),
            "sent" => Ok(InviteStatus::Sent),
            "accepted" => Ok(InviteStatus::Accepted),
            "failed" => Ok(InviteStatus::Failed),
            other => Err(UnknownVariant::new("invite_status", other)),
        }
    }
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending or consumed invitation for one phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invite {
    pub id: Uuid,
    /// Canonical `+`-prefixed phone.
    pub phone: String,
    pub name: String,
    pub relationship: Relationship,
    pub status: InviteStatus,
    pub invite_code: String,
    /// Grants the administrator flag when the invite is accepted.
    pub is_admin_invite: bool,
    pub invited_by: Option<Uuid>,
    pub invited_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Request to invite a new family member (administrator action).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInviteRequest {
    #[validate(length(min = 6, max = 20, message = "phone must be 6-20 characters"))]
    pub phone: String,

    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    pub relationship: Relationship,

    #[serde(default)]
    pub is_admin_invite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            InviteStatus::Pending,
            InviteStatus::Sent,
            InviteStatus::Accepted,
            InviteStatus::Failed,
        ] {
            assert_eq!(s.as_str().parse::<InviteStatus>().unwrap(), s);
        }
        assert!("revoked".parse::<InviteStatus>().is_err());
    }

    #[test]
    fn test_create_invite_request_validation() {
        let valid = CreateInviteRequest {
            phone: "+972501234567".to_string(),
            name: "Rivka".to_string(),
            relationship: Relationship::Daughter,
            is_admin_invite: false,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateInviteRequest {
            name: String::new(),
            ..valid.clone()
        };
        assert!(empty_name.validate().is_err());

        let short_phone = CreateInviteRequest {
            phone: "123".to_string(),
            ..valid
        };
        assert!(short_phone.validate().is_err());
    }
}
