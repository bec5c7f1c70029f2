//! Session JWT utilities using HS256 signing.
//!
//! The identity layer hands a verified phone number to this API after a
//! magic-link consumption; the session token carries that phone as its
//! subject and is validated on every authenticated request.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for session token operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the verified phone number in canonical `+` form.
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Configuration for session token generation and validation.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Session expiration in seconds.
    pub expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("expiry_secs", &self.expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

impl SessionKeys {
    /// Creates session keys from a shared HMAC secret.
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }

    /// Issues a session token for a verified phone number.
    pub fn issue(&self, phone: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: phone.to_string(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates a session token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keys() -> SessionKeys {
        SessionKeys::new("test-secret-at-least-32-bytes-long", 3600)
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let keys = test_keys();
        let token = keys.issue("+15551234567").expect("issue");
        let claims = keys.validate(&token).expect("validate");
        assert_eq!(claims.sub, "+15551234567");
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let keys = test_keys();
        assert!(matches!(
            keys.validate("not-a-token"),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let keys = test_keys();
        let other = SessionKeys::new("a-completely-different-secret-value", 3600);
        let token = keys.issue("+15551234567").expect("issue");
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut keys = test_keys();
        keys.expiry_secs = -120; // issued already expired
        keys.leeway_secs = 0;
        let token = keys.issue("+15551234567").expect("issue");
        assert!(matches!(
            keys.validate(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_jti_unique_per_token() {
        let keys = test_keys();
        let a = keys.validate(&keys.issue("+1").unwrap()).unwrap();
        let b = keys.validate(&keys.issue("+1").unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
