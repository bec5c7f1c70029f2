//! Family profile routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::profile::{FamilyProfile, SetAdminRequest, UpsertProfileRequest};
use persistence::repositories::ProfileRepository;
use shared::phone;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// The requester's own profile, if one exists.
///
/// GET /api/v1/profiles/me
pub async fn get_my_profile(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Option<FamilyProfile>>, ApiError> {
    Ok(Json(user_auth.profile(&state).await?))
}

/// Create or update the requester's own profile.
///
/// PUT /api/v1/profiles/me
pub async fn upsert_my_profile(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<UpsertProfileRequest>,
) -> Result<(StatusCode, Json<FamilyProfile>), ApiError> {
    request.validate()?;

    let repo = ProfileRepository::new(state.pool.clone());

    if let Some(existing) = user_auth.profile(&state).await? {
        let updated = repo
            .update(
                existing.id,
                &request.name,
                request.hebrew_name.as_deref(),
                request.relationship,
            )
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
        return Ok((StatusCode::OK, Json(updated)));
    }

    let profile = repo
        .create(
            &phone::with_plus(&user_auth.phone),
            &request.name,
            request.hebrew_name.as_deref(),
            request.relationship,
            false,
        )
        .await?;

    info!(profile_id = %profile.id, phone = %profile.phone, "Profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// All family member profiles.
///
/// GET /api/v1/profiles
pub async fn list_profiles(
    State(state): State<AppState>,
    _user_auth: UserAuth,
) -> Result<Json<Vec<FamilyProfile>>, ApiError> {
    let profiles = ProfileRepository::new(state.pool.clone()).list_all().await?;
    Ok(Json(profiles))
}

/// Toggle another member's administrator flag.
///
/// PUT /api/v1/profiles/:profile_id/admin
pub async fn set_admin(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(profile_id): Path<Uuid>,
    Json(request): Json<SetAdminRequest>,
) -> Result<StatusCode, ApiError> {
    let admin = user_auth.require_admin(&state).await?;

    let repo = ProfileRepository::new(state.pool.clone());
    if repo.set_admin(profile_id, request.is_admin).await? == 0 {
        return Err(ApiError::NotFound("Profile not found".to_string()));
    }

    info!(
        profile_id = %profile_id,
        is_admin = request.is_admin,
        changed_by = %admin.id,
        "Administrator flag changed"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a profile (administrator action; self-deletion refused).
///
/// DELETE /api/v1/profiles/:profile_id
pub async fn delete_profile(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(profile_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let admin = user_auth.require_admin(&state).await?;

    if profile_id == admin.id {
        return Err(ApiError::Forbidden(
            "Cannot delete your own profile".to_string(),
        ));
    }

    let repo = ProfileRepository::new(state.pool.clone());
    if repo.delete(profile_id).await? == 0 {
        return Err(ApiError::NotFound("Profile not found".to_string()));
    }

    info!(profile_id = %profile_id, deleted_by = %admin.id, "Profile deleted");
    Ok(StatusCode::NO_CONTENT)
}
