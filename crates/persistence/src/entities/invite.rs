//! Invite entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::invite::{Invite, InviteStatus};
use domain::models::profile::Relationship;
use sqlx::FromRow;
use uuid::Uuid;

use super::decode_error;

/// Database entity for invites.
#[derive(Debug, Clone, FromRow)]
pub struct InviteEntity {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
    pub relationship: String,
    pub status: String,
    pub invite_code: String,
    pub is_admin_invite: bool,
    pub invited_by: Option<Uuid>,
    pub invited_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl TryFrom<InviteEntity> for Invite {
    type Error = sqlx::Error;

    fn try_from(entity: InviteEntity) -> Result<Self, Self::Error> {
        let relationship: Relationship = entity.relationship.parse().map_err(decode_error)?;
        let status: InviteStatus = entity.status.parse().map_err(decode_error)?;
        Ok(Invite {
            id: entity.id,
            phone: entity.phone,
            name: entity.name,
            relationship,
            status,
            invite_code: entity.invite_code,
            is_admin_invite: entity.is_admin_invite,
            invited_by: entity.invited_by,
            invited_at: entity.invited_at,
            accepted_at: entity.accepted_at,
            error: entity.error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let now = Utc::now();
        let entity = InviteEntity {
            id: Uuid::new_v4(),
            phone: "+972501234567".to_string(),
            name: "רבקה".to_string(),
            relationship: "בת".to_string(),
            status: "sent".to_string(),
            invite_code: "a1b2c3d4".to_string(),
            is_admin_invite: false,
            invited_by: Some(Uuid::new_v4()),
            invited_at: now,
            accepted_at: None,
            error: None,
        };

        let invite: Invite = entity.clone().try_into().expect("convert");
        assert_eq!(invite.status, InviteStatus::Sent);
        assert_eq!(invite.relationship, Relationship::Daughter);
        assert_eq!(invite.invite_code, "a1b2c3d4");
    }

    #[test]
    fn test_bad_status_fails() {
        let now = Utc::now();
        let entity = InviteEntity {
            id: Uuid::new_v4(),
            phone: "+972501234567".to_string(),
            name: "רבקה".to_string(),
            relationship: "בת".to_string(),
            status: "revoked".to_string(),
            invite_code: "a1b2c3d4".to_string(),
            is_admin_invite: false,
            invited_by: None,
            invited_at: now,
            accepted_at: None,
            error: None,
        };

        assert!(Invite::try_from(entity).is_err());
    }
}
