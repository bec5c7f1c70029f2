//! Registration request entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::profile::Relationship;
use domain::models::registration::{RegistrationRequest, RegistrationStatus};
use sqlx::FromRow;
use uuid::Uuid;

use super::decode_error;

/// Database entity for registration requests.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationRequestEntity {
    pub id: Uuid,
    pub phone: String,
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub status: String,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRequestEntity> for RegistrationRequest {
    type Error = sqlx::Error;

    fn try_from(entity: RegistrationRequestEntity) -> Result<Self, Self::Error> {
        let status: RegistrationStatus = entity.status.parse().map_err(decode_error)?;
        let relationship = entity
            .relationship
            .map(|r| r.parse::<Relationship>().map_err(decode_error))
            .transpose()?;
        Ok(RegistrationRequest {
            id: entity.id,
            phone: entity.phone,
            name: entity.name,
            relationship,
            status,
            approved_by: entity.approved_by,
            approved_at: entity.approved_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let now = Utc::now();
        let entity = RegistrationRequestEntity {
            id: Uuid::new_v4(),
            phone: "+15551234567".to_string(),
            name: Some("Yosef Cohen".to_string()),
            relationship: Some("בן".to_string()),
            status: "pending_approval".to_string(),
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };

        let request: RegistrationRequest = entity.try_into().expect("convert");
        assert_eq!(request.status, RegistrationStatus::PendingApproval);
        assert_eq!(request.relationship, Some(Relationship::Son));
    }

    #[test]
    fn test_entity_without_details() {
        let now = Utc::now();
        let entity = RegistrationRequestEntity {
            id: Uuid::new_v4(),
            phone: "+15551234567".to_string(),
            name: None,
            relationship: None,
            status: "pending_details".to_string(),
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };

        let request: RegistrationRequest = entity.try_into().expect("convert");
        assert_eq!(request.status, RegistrationStatus::PendingDetails);
        assert!(request.name.is_none());
        assert!(request.relationship.is_none());
    }
}
