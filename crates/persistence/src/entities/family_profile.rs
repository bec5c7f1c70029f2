//! Family profile entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::profile::{FamilyProfile, Relationship};
use sqlx::FromRow;
use uuid::Uuid;

use super::decode_error;

/// Database entity for family profiles.
#[derive(Debug, Clone, FromRow)]
pub struct FamilyProfileEntity {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
    pub hebrew_name: Option<String>,
    pub relationship: String,
    pub is_admin: bool,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FamilyProfileEntity> for FamilyProfile {
    type Error = sqlx::Error;

    fn try_from(entity: FamilyProfileEntity) -> Result<Self, Self::Error> {
        let relationship: Relationship =
            entity.relationship.parse().map_err(decode_error)?;
        Ok(FamilyProfile {
            id: entity.id,
            phone: entity.phone,
            name: entity.name,
            hebrew_name: entity.hebrew_name,
            relationship,
            is_admin: entity.is_admin,
            last_visit_at: entity.last_visit_at,
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
        let entity = FamilyProfileEntity {
            id: Uuid::new_v4(),
            phone: "+972501234567".to_string(),
            name: "Yosef Cohen".to_string(),
            hebrew_name: Some("יוסף".to_string()),
            relationship: "בן".to_string(),
            is_admin: true,
            last_visit_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let profile: FamilyProfile = entity.clone().try_into().expect("convert");
        assert_eq!(profile.id, entity.id);
        assert_eq!(profile.relationship, Relationship::Son);
        assert!(profile.is_admin);
        assert_eq!(profile.last_visit_at, Some(now));
    }

    #[test]
    fn test_entity_with_bad_relationship_fails() {
        let now = Utc::now();
        let entity = FamilyProfileEntity {
            id: Uuid::new_v4(),
            phone: "+972501234567".to_string(),
            name: "Yosef Cohen".to_string(),
            hebrew_name: None,
            relationship: "cousin".to_string(),
            is_admin: false,
            last_visit_at: None,
            created_at: now,
            updated_at: now,
        };

        assert!(FamilyProfile::try_from(entity).is_err());
    }
}
