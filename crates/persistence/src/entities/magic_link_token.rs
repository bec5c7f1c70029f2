//! Magic-link token entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::magic_link::MagicLinkToken;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for magic-link tokens.
#[derive(Debug, Clone, FromRow)]
pub struct MagicLinkTokenEntity {
    pub id: Uuid,
    pub phone: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub return_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MagicLinkTokenEntity> for MagicLinkToken {
    fn from(entity: MagicLinkTokenEntity) -> Self {
        MagicLinkToken {
            id: entity.id,
            phone: entity.phone,
            token: entity.token,
            expires_at: entity.expires_at,
            used: entity.used,
            return_url: entity.return_url,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let now = Utc::now();
        let entity = MagicLinkTokenEntity {
            id: Uuid::new_v4(),
            phone: "+15551234567".to_string(),
            token: "tok123".to_string(),
            expires_at: now,
            used: false,
            return_url: Some("/schedule".to_string()),
            created_at: now,
        };

        let token: MagicLinkToken = entity.clone().into();
        assert_eq!(token.id, entity.id);
        assert_eq!(token.token, "tok123");
        assert!(!token.used);
        assert_eq!(token.return_url.as_deref(), Some("/schedule"));
    }
}
