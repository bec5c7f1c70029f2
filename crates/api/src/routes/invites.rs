//! Invite management routes.
//!
//! Invites are delivered directly over WhatsApp (there is no profile row
//! to queue a notification against until the invite is accepted).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::invite::{CreateInviteRequest, Invite, InviteStatus};
use domain::models::profile::FamilyProfile;
use domain::services::{dialogue, SendOutcome};
use persistence::repositories::{InviteRepository, ProfileRepository};
use shared::{crypto, phone};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

async fn deliver_invite(state: &AppState, invite: &Invite) -> Result<Invite, ApiError> {
    let repo = InviteRepository::new(state.pool.clone());
    let body = dialogue::invite_body(
        &invite.name,
        &state.config.app.base_url,
        &invite.invite_code,
    );

    match state.sender.send_text(&invite.phone, &body).await {
        SendOutcome::Sent { .. } => {
            repo.mark_sent(invite.id).await?;
        }
        SendOutcome::Failed(reason) => {
            repo.mark_failed(invite.id, &reason).await?;
        }
        SendOutcome::NotConfigured => {
            repo.mark_failed(invite.id, "WhatsApp credentials not configured")
                .await?;
        }
    }

    repo.find_by_id(invite.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite not found".to_string()))
}

/// Invite a new family member and deliver the invitation.
///
/// POST /api/v1/invites
pub async fn create_invite(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<Invite>), ApiError> {
    let admin = user_auth.require_admin(&state).await?;
    request.validate()?;

    let invite_phone = phone::canonicalize(&request.phone);

    let profiles = ProfileRepository::new(state.pool.clone());
    let variants = phone::lookup_variants(&invite_phone);
    if profiles.find_by_phone_variants(&variants).await?.is_some() {
        return Err(ApiError::Conflict(
            "A member with this phone already exists".to_string(),
        ));
    }

    let invites = InviteRepository::new(state.pool.clone());
    if let Some(existing) = invites.find_by_phone(&invite_phone).await? {
        if existing.status != InviteStatus::Failed {
            return Err(ApiError::Conflict(
                "An invite for this phone already exists".to_string(),
            ));
        }
        // A failed invite is replaced outright.
        invites.delete(existing.id).await?;
    }

    let invite = invites
        .create(
            &invite_phone,
            &request.name,
            request.relationship,
            &crypto::generate_invite_code(),
            request.is_admin_invite,
            Some(admin.id),
            Utc::now(),
        )
        .await?;

    let invite = deliver_invite(&state, &invite).await?;

    info!(
        invite_id = %invite.id,
        phone = %invite.phone,
        invited_by = %admin.id,
        "Invite created"
    );
    Ok((StatusCode::CREATED, Json(invite)))
}

/// All invites, newest first.
///
/// GET /api/v1/invites
pub async fn list_invites(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<Invite>>, ApiError> {
    user_auth.require_admin(&state).await?;
    let invites = InviteRepository::new(state.pool.clone()).list_all().await?;
    Ok(Json(invites))
}

/// Reset and redeliver an invite.
///
/// POST /api/v1/invites/:invite_id/resend
pub async fn resend_invite(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(invite_id): Path<Uuid>,
) -> Result<Json<Invite>, ApiError> {
    let admin = user_auth.require_admin(&state).await?;

    let repo = InviteRepository::new(state.pool.clone());
    let invite = repo
        .find_by_id(invite_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite not found".to_string()))?;

    if invite.status == InviteStatus::Accepted {
        return Err(ApiError::InvalidState(
            "Invite has already been accepted".to_string(),
        ));
    }

    repo.reset_for_resend(invite_id, Utc::now()).await?;
    let invite = deliver_invite(&state, &invite).await?;

    info!(invite_id = %invite_id, resent_by = %admin.id, "Invite resent");
    Ok(Json(invite))
}

/// Delete an invite.
///
/// DELETE /api/v1/invites/:invite_id
pub async fn delete_invite(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(invite_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user_auth.require_admin(&state).await?;

    let repo = InviteRepository::new(state.pool.clone());
    if repo.delete(invite_id).await? == 0 {
        return Err(ApiError::NotFound("Invite not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Accept the invite matching the caller's verified phone, creating the
/// family profile and consuming the invite.
///
/// POST /api/v1/invites/accept
pub async fn accept_invite(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<(StatusCode, Json<FamilyProfile>), ApiError> {
    let profiles = ProfileRepository::new(state.pool.clone());
    let invites = InviteRepository::new(state.pool.clone());

    if user_auth.profile(&state).await?.is_some() {
        return Err(ApiError::Conflict(
            "A profile already exists for this phone".to_string(),
        ));
    }

    let canonical = phone::with_plus(&user_auth.phone);
    let invite = invites
        .find_by_phone(&canonical)
        .await?
        .ok_or_else(|| ApiError::NotFound("No invite for this phone".to_string()))?;

    if invite.status == InviteStatus::Accepted {
        return Err(ApiError::InvalidState(
            "Invite has already been accepted".to_string(),
        ));
    }

    let profile = profiles
        .create(
            &invite.phone,
            &invite.name,
            None,
            invite.relationship,
            invite.is_admin_invite,
        )
        .await?;

    invites.mark_accepted(invite.id, Utc::now()).await?;

    info!(
        profile_id = %profile.id,
        invite_id = %invite.id,
        "Invite accepted, profile created"
    );
    Ok((StatusCode::CREATED, Json(profile)))
}
