//! Magic-link token models and validation.
//!
//! A token is a single-use credential tied to a phone number. Validation is
//! read-only and repeatable; consumption flips `used` exactly once before
//! the phone is handed to the identity layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime from issuance.
pub const TOKEN_TTL_MINUTES: i64 = 10;

/// Expired tokens older than this are swept by the cleanup job.
pub const CLEANUP_RETENTION_HOURS: i64 = 24;

/// Expiry instant for a token issued at `now`.
pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(TOKEN_TTL_MINUTES)
}

/// Cutoff below which expired tokens are deleted.
pub fn cleanup_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(CLEANUP_RETENTION_HOURS)
}

/// A stored single-use login token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MagicLinkToken {
    pub id: Uuid,
    /// Canonical `+`-prefixed phone.
    pub phone: String,
    /// Opaque random token; doubles as the verification code handed to the
    /// identity layer.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub return_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a read-only token validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenValidation {
    Valid {
        phone: String,
        return_url: Option<String>,
    },
    NotFound,
    AlreadyUsed,
    /// Carries the phone so the caller can offer a resend.
    Expired {
        phone: String,
    },
}

impl TokenValidation {
    /// Evaluates a looked-up token against the current instant. The order
    /// matters: a used token reports `AlreadyUsed` even after its expiry.
    pub fn evaluate(token: Option<&MagicLinkToken>, now: DateTime<Utc>) -> Self {
        match token {
            None => TokenValidation::NotFound,
            Some(t) if t.used => TokenValidation::AlreadyUsed,
            Some(t) if now > t.expires_at => TokenValidation::Expired {
                phone: t.phone.clone(),
            },
            Some(t) => TokenValidation::Valid {
                phone: t.phone.clone(),
                return_url: t.return_url.clone(),
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TokenValidation::Valid { .. })
    }
}

/// Payload returned by a successful consumption, handed to the identity
/// layer for the final sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConsumedToken {
    pub phone: String,
    /// The token itself is the verification code.
    pub code: String,
    pub return_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(used: bool, expires_in_minutes: i64) -> MagicLinkToken {
        let now = Utc::now();
        MagicLinkToken {
            id: Uuid::new_v4(),
            phone: "+972501234567".to_string(),
            token: "abc123".to_string(),
            expires_at: now + Duration::minutes(expires_in_minutes),
            used,
            return_url: Some("/schedule".to_string()),
            created_at: now,
        }
    }

    #[test]
    fn test_evaluate_missing_token() {
        assert_eq!(
            TokenValidation::evaluate(None, Utc::now()),
            TokenValidation::NotFound
        );
    }

    #[test]
    fn test_evaluate_valid_token() {
        let t = token(false, 5);
        let outcome = TokenValidation::evaluate(Some(&t), Utc::now());
        assert_eq!(
            outcome,
            TokenValidation::Valid {
                phone: "+972501234567".to_string(),
                return_url: Some("/schedule".to_string()),
            }
        );
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_evaluate_used_token() {
        let t = token(true, 5);
        assert_eq!(
            TokenValidation::evaluate(Some(&t), Utc::now()),
            TokenValidation::AlreadyUsed
        );
    }

    #[test]
    fn test_evaluate_expired_token() {
        let t = token(false, -5);
        assert_eq!(
            TokenValidation::evaluate(Some(&t), Utc::now()),
            TokenValidation::Expired {
                phone: "+972501234567".to_string()
            }
        );
    }

    #[test]
    fn test_used_wins_over_expired() {
        let t = token(true, -5);
        assert_eq!(
            TokenValidation::evaluate(Some(&t), Utc::now()),
            TokenValidation::AlreadyUsed
        );
    }

    #[test]
    fn test_expiry_from_is_ten_minutes() {
        let now = Utc::now();
        assert_eq!(expiry_from(now) - now, Duration::minutes(10));
    }

    #[test]
    fn test_cleanup_cutoff_is_24_hours() {
        let now = Utc::now();
        assert_eq!(now - cleanup_cutoff(now), Duration::hours(24));
    }
}
