//! Registration conversation state.
//!
//! One row per phone number that has started the WhatsApp onboarding
//! dialogue. The row *is* the conversation state; there is no in-process
//! session, so any server instance can pick up the next inbound message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::profile::Relationship;
use super::UnknownVariant;

/// Conversation state for an onboarding phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Collecting name and relationship.
    PendingDetails,
    /// Details complete, waiting for a coordinator's decision.
    PendingApproval,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::PendingDetails => "pending_details",
            RegistrationStatus::PendingApproval => "pending_approval",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
        }
    }

    /// Terminal states are never re-entered by the dialogue.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::Approved | RegistrationStatus::Rejected
        )
    }
}

impl FromStr for RegistrationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_details" => Ok(RegistrationStatus::PendingDetails),
            "pending_approval" => Ok(RegistrationStatus::PendingApproval),
            "approved" => Ok(RegistrationStatus::Approved),
            "rejected" => Ok(RegistrationStatus::Rejected),
            other => Err(UnknownVariant::new("registration_status", other)),
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Onboarding request for one phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistrationRequest {
    pub id: Uuid,
    /// Canonical `+`-prefixed phone.
    pub phone: String,
    pub name: Option<String>,
    pub relationship: Option<Relationship>,
    pub status: RegistrationStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            RegistrationStatus::PendingDetails,
            RegistrationStatus::PendingApproval,
            RegistrationStatus::Approved,
            RegistrationStatus::Rejected,
        ] {
            assert_eq!(s.as_str().parse::<RegistrationStatus>().unwrap(), s);
        }
        assert!("waiting".parse::<RegistrationStatus>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(RegistrationStatus::Approved.is_terminal());
        assert!(RegistrationStatus::Rejected.is_terminal());
        assert!(!RegistrationStatus::PendingDetails.is_terminal());
        assert!(!RegistrationStatus::PendingApproval.is_terminal());
    }
}
