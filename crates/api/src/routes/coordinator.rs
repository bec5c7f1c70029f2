//! Coordinator dashboard routes.
//!
//! All handlers require the administrator flag.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use domain::models::dashboard::{
    CoordinatorStats, FamilyActivity, NotificationBacklog, WeekCoverage,
};
use domain::models::notification::NotificationStatus;
use domain::models::profile::MemberActivity;
use domain::models::visit_slot::{BookForMemberRequest, DayCoverage, VisitSlot};
use persistence::repositories::{NotificationRepository, ProfileRepository, VisitSlotRepository};
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::visits::book_slot_for_profile;
use crate::services::CoverageService;

/// Bookable cells in the dashboard's one-week window.
const WEEK_SLOT_COUNT: usize = 7 * 3;

/// Dashboard stats: weekly coverage, member activity, queue backlog.
///
/// GET /api/v1/coordinator/stats
pub async fn get_stats(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<CoordinatorStats>, ApiError> {
    user_auth.require_admin(&state).await?;

    let now = Utc::now();
    let today = now.date_naive();
    let week_end = today + Duration::days(6);

    let slots = VisitSlotRepository::new(state.pool.clone())
        .list_range(today, week_end)
        .await?;
    let booked = slots.iter().filter(|s| s.slot.is_booked()).count();

    let profiles = ProfileRepository::new(state.pool.clone()).list_all().await?;
    let threshold = state.config.app.inactive_threshold_days;
    let active = profiles
        .iter()
        .filter(|p| !p.is_inactive(now, threshold))
        .count();

    let notifications = NotificationRepository::new(state.pool.clone());
    let pending = notifications
        .count_by_status(NotificationStatus::Pending)
        .await?;
    let failed = notifications
        .count_by_status(NotificationStatus::Failed)
        .await?;

    Ok(Json(CoordinatorStats {
        upcoming_week: WeekCoverage {
            total_slots: WEEK_SLOT_COUNT,
            booked,
            empty: WEEK_SLOT_COUNT.saturating_sub(booked),
            coverage: (booked * 100 / WEEK_SLOT_COUNT) as u32,
        },
        family_activity: FamilyActivity {
            total_members: profiles.len(),
            active_members: active,
            inactive_members: profiles.len() - active,
        },
        notifications: NotificationBacklog { pending, failed },
    }))
}

#[derive(Debug, Deserialize)]
pub struct GapsQuery {
    pub days_ahead: Option<u32>,
}

/// Day-by-day coverage analysis for the upcoming days.
///
/// GET /api/v1/coordinator/gaps?days_ahead=...
pub async fn get_gaps(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(query): Query<GapsQuery>,
) -> Result<Json<Vec<DayCoverage>>, ApiError> {
    user_auth.require_admin(&state).await?;

    let days_ahead = query.days_ahead.unwrap_or(14).clamp(1, 60);
    let coverage = CoverageService::new(state.pool.clone())
        .day_coverage(Utc::now(), days_ahead)
        .await?;
    Ok(Json(coverage))
}

/// Family members with activity statistics.
///
/// GET /api/v1/coordinator/members
pub async fn get_members(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<MemberActivity>>, ApiError> {
    user_auth.require_admin(&state).await?;

    let now = Utc::now();
    let threshold = state.config.app.inactive_threshold_days;

    let profiles = ProfileRepository::new(state.pool.clone()).list_all().await?;
    let counts: HashMap<_, _> = VisitSlotRepository::new(state.pool.clone())
        .booking_counts()
        .await?
        .into_iter()
        .collect();

    let members = profiles
        .into_iter()
        .map(|profile| {
            let total_bookings = counts.get(&profile.id).copied().unwrap_or(0);
            let days_since_last_visit = profile.days_since_last_visit(now);
            let is_active = !profile.is_inactive(now, threshold);
            MemberActivity {
                profile,
                total_bookings,
                days_since_last_visit,
                is_active,
            }
        })
        .collect();

    Ok(Json(members))
}

/// Book a slot on behalf of a family member.
///
/// POST /api/v1/coordinator/visits
pub async fn book_for_member(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<BookForMemberRequest>,
) -> Result<(StatusCode, Json<VisitSlot>), ApiError> {
    user_auth.require_admin(&state).await?;
    request.validate()?;

    let member = ProfileRepository::new(state.pool.clone())
        .find_by_id(request.profile_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    let slot = book_slot_for_profile(
        &state,
        &member,
        request.date,
        request.time_of_day,
        request.notes.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(slot)))
}
