//! Session token authentication extractor.
//!
//! Validates the Bearer token issued after magic-link consumption and
//! exposes the verified phone number. Profile resolution is a separate
//! step so handlers can distinguish "no session" from "no profile yet".

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::FamilyProfile;
use persistence::repositories::ProfileRepository;
use shared::phone;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated caller identity from the session token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// Verified phone number in canonical `+` form.
    pub phone: String,
}

impl UserAuth {
    /// Resolve the caller's family profile, tolerating stored phone
    /// formatting differences.
    pub async fn profile(&self, state: &AppState) -> Result<Option<FamilyProfile>, ApiError> {
        let repo = ProfileRepository::new(state.pool.clone());
        let variants = phone::lookup_variants(&self.phone);
        Ok(repo.find_by_phone_variants(&variants).await?)
    }

    /// Resolve the caller's profile or fail with `ProfileMissing`.
    pub async fn require_profile(&self, state: &AppState) -> Result<FamilyProfile, ApiError> {
        self.profile(state).await?.ok_or_else(|| {
            ApiError::ProfileMissing("Please complete your profile first".to_string())
        })
    }

    /// Resolve the caller's profile and require the administrator flag.
    pub async fn require_admin(&self, state: &AppState) -> Result<FamilyProfile, ApiError> {
        let profile = self.require_profile(state).await?;
        if !profile.is_admin {
            return Err(ApiError::Forbidden(
                "Administrator access required".to_string(),
            ));
        }
        Ok(profile)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthenticated("Missing Authorization header".to_string())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthenticated("Invalid Authorization header format".to_string())
        })?;

        let claims = state.session_keys.validate(token).map_err(|_| {
            ApiError::Unauthenticated("Invalid or expired session token".to_string())
        })?;

        Ok(UserAuth { phone: claims.sub })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_auth_holds_phone() {
        let auth = UserAuth {
            phone: "+972501234567".to_string(),
        };
        assert_eq!(auth.phone, "+972501234567");
    }

    #[test]
    fn test_user_auth_clone_and_debug() {
        let auth = UserAuth {
            phone: "+972501234567".to_string(),
        };
        let cloned = auth.clone();
        assert_eq!(auth.phone, cloned.phone);
        assert!(format!("{:?}", auth).contains("UserAuth"));
    }
}
