//! Visit slot routes: booking, cancellation, schedule views.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, NaiveDate, Utc};
use domain::models::notification::NotificationType;
use domain::models::profile::FamilyProfile;
use domain::models::visit_slot::{BookSlotRequest, ScheduleSlot, TimeOfDay, VisitSlot};
use domain::services::calendar;
use persistence::repositories::{NotificationRepository, ProfileRepository, VisitSlotRepository};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Book a slot for a profile: the shared path behind both the member and
/// the coordinator booking routes.
///
/// Enforces the Sabbath window and the one-active-booking-per-cell
/// invariant, stamps the profile's last visit, and queues the confirmation
/// and (when far enough out) the 24-hours-before reminder.
pub(crate) async fn book_slot_for_profile(
    state: &AppState,
    profile: &FamilyProfile,
    date: NaiveDate,
    time_of_day: TimeOfDay,
    notes: Option<&str>,
) -> Result<VisitSlot, ApiError> {
    if calendar::is_blocked(date, time_of_day) {
        return Err(ApiError::SabbathBlocked(
            "This slot falls during the Sabbath".to_string(),
        ));
    }

    let now = Utc::now();
    let flags = state.calendar.day_flags(date);

    let slot_repo = VisitSlotRepository::new(state.pool.clone());
    let slot = slot_repo
        .book(
            date,
            time_of_day,
            profile.id,
            now,
            notes,
            flags.is_sabbath,
            flags.is_holiday,
            flags.holiday_name.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::Conflict("This slot is already booked".to_string()))?;

    let profile_repo = ProfileRepository::new(state.pool.clone());
    profile_repo.touch_last_visit(profile.id, now).await?;

    let notifications = NotificationRepository::new(state.pool.clone());
    notifications
        .enqueue(
            profile.id,
            NotificationType::Confirmation,
            now,
            Some(slot.id),
            None,
        )
        .await?;

    // Reminder 24h before the visit start, only when that instant is still
    // ahead of us and no reminder is queued for this profile+slot yet.
    let reminder_at = time_of_day.start_instant(date) - Duration::hours(24);
    if reminder_at > now && !notifications.reminder_exists(profile.id, slot.id).await? {
        notifications
            .enqueue(
                profile.id,
                NotificationType::Reminder,
                reminder_at,
                Some(slot.id),
                None,
            )
            .await?;
    }

    info!(
        slot_id = %slot.id,
        profile_id = %profile.id,
        date = %date,
        time_of_day = %time_of_day,
        "Slot booked"
    );

    Ok(slot)
}

/// Book a visit slot.
///
/// POST /api/v1/visits
pub async fn book_slot(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<BookSlotRequest>,
) -> Result<(StatusCode, Json<VisitSlot>), ApiError> {
    request.validate()?;
    let profile = user_auth.require_profile(&state).await?;

    let slot = book_slot_for_profile(
        &state,
        &profile,
        request.date,
        request.time_of_day,
        request.notes.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(slot)))
}

/// Cancel a booking. Only the original booker or an administrator may
/// cancel; the row is retained as an audit artifact.
///
/// DELETE /api/v1/visits/:slot_id
pub async fn cancel_slot(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(slot_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let slot_repo = VisitSlotRepository::new(state.pool.clone());
    let slot = slot_repo
        .find_by_id(slot_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Slot not found".to_string()))?;

    let profile = user_auth.require_profile(&state).await?;

    if slot.booked_by != Some(profile.id) && !profile.is_admin {
        return Err(ApiError::Unauthorized(
            "Can only cancel your own bookings".to_string(),
        ));
    }

    slot_repo.clear_booking(slot_id).await?;

    info!(
        slot_id = %slot_id,
        profile_id = %profile.id,
        "Booking cancelled"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Schedule for a date range, enriched with booker profiles.
///
/// GET /api/v1/visits/schedule?start_date=...&end_date=...
pub async fn get_schedule(
    State(state): State<AppState>,
    _user_auth: UserAuth,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<ScheduleSlot>>, ApiError> {
    if query.end_date < query.start_date {
        return Err(ApiError::Validation(
            "end_date must not precede start_date".to_string(),
        ));
    }

    let slots = VisitSlotRepository::new(state.pool.clone())
        .list_range(query.start_date, query.end_date)
        .await?;
    Ok(Json(slots))
}

/// All slots for one date.
///
/// GET /api/v1/visits/by-date/:date
pub async fn get_slots_by_date(
    State(state): State<AppState>,
    _user_auth: UserAuth,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<ScheduleSlot>>, ApiError> {
    let slots = VisitSlotRepository::new(state.pool.clone())
        .list_by_date(date)
        .await?;
    Ok(Json(slots))
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
}

/// Point lookup for one calendar cell.
///
/// GET /api/v1/visits/slot?date=...&time_of_day=...
pub async fn get_slot(
    State(state): State<AppState>,
    _user_auth: UserAuth,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Option<VisitSlot>>, ApiError> {
    let slot = VisitSlotRepository::new(state.pool.clone())
        .find_by_date_and_time(query.date, query.time_of_day)
        .await?;
    Ok(Json(slot))
}

/// The requester's bookings.
///
/// GET /api/v1/visits/mine
pub async fn get_my_bookings(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<VisitSlot>>, ApiError> {
    let Some(profile) = user_auth.profile(&state).await? else {
        return Ok(Json(Vec::new()));
    };

    let slots = VisitSlotRepository::new(state.pool.clone())
        .list_booked_by(profile.id)
        .await?;
    Ok(Json(slots))
}
