//! Notification queue routes: history, nudges, cancellation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::notification::{
    Notification, NotificationStatus, NotificationType, NotificationWithProfile, SendNudgeRequest,
};
use domain::services::templates::DEFAULT_NUDGE_MESSAGE;
use persistence::repositories::{NotificationRepository, ProfileRepository};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// The requester's notification history, newest first.
///
/// GET /api/v1/notifications/mine
pub async fn get_my_notifications(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let Some(profile) = user_auth.profile(&state).await? else {
        return Ok(Json(Vec::new()));
    };

    let notifications = NotificationRepository::new(state.pool.clone())
        .list_for_profile(profile.id, 20)
        .await?;
    Ok(Json(notifications))
}

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// Full notification history (administrators only).
///
/// GET /api/v1/notifications?status=...&limit=...
pub async fn list_notifications(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<Vec<NotificationWithProfile>>, ApiError> {
    user_auth.require_admin(&state).await?;

    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<NotificationStatus>()
                .map_err(|e| ApiError::Validation(e.to_string()))
        })
        .transpose()?;
    let limit = query.limit.unwrap_or(100).clamp(1, 500);

    let notifications = NotificationRepository::new(state.pool.clone())
        .list_all(status, limit)
        .await?;
    Ok(Json(notifications))
}

/// Queue an ad hoc nudge to a family member (administrators only).
///
/// POST /api/v1/notifications/nudge
pub async fn send_nudge(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<SendNudgeRequest>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let admin = user_auth.require_admin(&state).await?;
    request.validate()?;

    let profiles = ProfileRepository::new(state.pool.clone());
    profiles
        .find_by_id(request.profile_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    let message = request
        .message
        .unwrap_or_else(|| DEFAULT_NUDGE_MESSAGE.to_string());

    let notification = NotificationRepository::new(state.pool.clone())
        .enqueue(
            request.profile_id,
            NotificationType::Nudge,
            Utc::now(),
            None,
            Some(&message),
        )
        .await?;

    info!(
        notification_id = %notification.id,
        profile_id = %request.profile_id,
        sent_by = %admin.id,
        "Nudge queued"
    );
    Ok((StatusCode::CREATED, Json(notification)))
}

/// Cancel a notification while it is still pending (hard delete).
///
/// DELETE /api/v1/notifications/:notification_id
pub async fn cancel_notification(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let profile = user_auth.require_profile(&state).await?;

    let repo = NotificationRepository::new(state.pool.clone());
    let notification = repo
        .find_by_id(notification_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    if notification.profile_id != profile.id && !profile.is_admin {
        return Err(ApiError::Unauthorized(
            "Can only cancel your own notifications".to_string(),
        ));
    }

    if notification.status != NotificationStatus::Pending {
        return Err(ApiError::InvalidState(
            "Can only cancel pending notifications".to_string(),
        ));
    }

    // Conditional delete: losing a race with the dispatcher surfaces as
    // the same invalid-state error.
    if repo.delete_pending(notification_id).await? == 0 {
        return Err(ApiError::InvalidState(
            "Can only cancel pending notifications".to_string(),
        ));
    }

    info!(notification_id = %notification_id, "Notification cancelled");
    Ok(StatusCode::NO_CONTENT)
}
