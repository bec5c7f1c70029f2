//! Schedule coverage scans: gap detection and activity nudges.
//!
//! Both scans enqueue notifications and rely on their run frequency, not
//! dedup logic, to avoid duplicate alerts: running a scan twice on the same
//! day queues the same alerts twice.

use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use domain::models::dashboard::{GapScanSummary, NudgeSweepSummary};
use domain::models::notification::NotificationType;
use domain::models::visit_slot::{DayCoverage, ScheduleSlot, TimeOfDay};
use domain::services::calendar::{format_hebrew_date, is_blocked_date};
use persistence::repositories::{NotificationRepository, ProfileRepository, VisitSlotRepository};
use sqlx::PgPool;
use tracing::info;

/// Scans the near-term booking horizon.
pub struct CoverageService {
    slots: VisitSlotRepository,
    profiles: ProfileRepository,
    notifications: NotificationRepository,
}

impl CoverageService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            slots: VisitSlotRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
        }
    }

    /// Find dates in the horizon with zero coverage and alert every
    /// administrator about each one.
    pub async fn detect_gaps(
        &self,
        now: DateTime<Utc>,
        horizon_days: u32,
    ) -> Result<GapScanSummary, sqlx::Error> {
        let today = now.date_naive();
        let dates: Vec<NaiveDate> = (0..horizon_days)
            .filter_map(|i| today.checked_add_days(Days::new(i as u64)))
            .collect();
        let Some((&start, &end)) = dates.first().zip(dates.last()) else {
            return Ok(GapScanSummary {
                dates_checked: 0,
                gaps_found: 0,
                alerts_sent: 0,
                gaps: Vec::new(),
            });
        };

        let slots = self.slots.list_range(start, end).await?;

        let gaps: Vec<NaiveDate> = dates
            .iter()
            .copied()
            .filter(|date| !is_blocked_date(*date))
            .filter(|date| {
                !slots
                    .iter()
                    .any(|s| s.slot.date == *date && s.slot.is_booked())
            })
            .collect();

        let admins = self.profiles.list_admins().await?;
        let mut alerts_sent = 0;
        for gap in &gaps {
            let message = format_hebrew_date(*gap);
            for admin in &admins {
                self.notifications
                    .enqueue(
                        admin.id,
                        NotificationType::GapAlert,
                        now,
                        None,
                        Some(&message),
                    )
                    .await?;
                alerts_sent += 1;
            }
        }

        let summary = GapScanSummary {
            dates_checked: dates.len(),
            gaps_found: gaps.len(),
            alerts_sent,
            gaps,
        };
        info!(
            dates_checked = summary.dates_checked,
            gaps_found = summary.gaps_found,
            alerts_sent = summary.alerts_sent,
            "Gap scan complete"
        );
        Ok(summary)
    }

    /// Queue a nudge for every non-administrator member who has not
    /// visited within the threshold.
    pub async fn weekly_activity_nudge(
        &self,
        now: DateTime<Utc>,
        threshold_days: i64,
    ) -> Result<NudgeSweepSummary, sqlx::Error> {
        let cutoff = now - Duration::days(threshold_days);
        let inactive = self.profiles.list_inactive(cutoff).await?;

        for member in &inactive {
            let message = match member.days_since_last_visit(now) {
                Some(days) => format!(
                    "שלום {}! אבא מחכה לביקור שלך. ביקור אחרון: לפני {} ימים",
                    member.name, days
                ),
                None => format!(
                    "שלום {}! אבא מחכה לביקור שלך. ביקור אחרון: לא מתועד",
                    member.name
                ),
            };
            self.notifications
                .enqueue(member.id, NotificationType::Nudge, now, None, Some(&message))
                .await?;
        }

        let summary = NudgeSweepSummary {
            inactive_members_found: inactive.len(),
            nudges_sent: inactive.len(),
        };
        info!(
            inactive_members = summary.inactive_members_found,
            "Activity nudge sweep complete"
        );
        Ok(summary)
    }

    /// Day-by-day coverage for the coordinator gap view.
    pub async fn day_coverage(
        &self,
        now: DateTime<Utc>,
        days_ahead: u32,
    ) -> Result<Vec<DayCoverage>, sqlx::Error> {
        let today = now.date_naive();
        let dates: Vec<NaiveDate> = (0..days_ahead)
            .filter_map(|i| today.checked_add_days(Days::new(i as u64)))
            .collect();
        let Some((&start, &end)) = dates.first().zip(dates.last()) else {
            return Ok(Vec::new());
        };

        let slots = self.slots.list_range(start, end).await?;

        Ok(dates
            .into_iter()
            .map(|date| {
                let find = |t: TimeOfDay| -> Option<ScheduleSlot> {
                    slots
                        .iter()
                        .find(|s| s.slot.date == date && s.slot.time_of_day == t)
                        .cloned()
                };
                let morning = find(TimeOfDay::Morning);
                let afternoon = find(TimeOfDay::Afternoon);
                let evening = find(TimeOfDay::Evening);
                let booked = [&morning, &afternoon, &evening]
                    .into_iter()
                    .filter(|s| s.as_ref().is_some_and(|s| s.slot.is_booked()))
                    .count();
                let blocked = is_blocked_date(date);

                DayCoverage {
                    date,
                    display_date: format_hebrew_date(date),
                    is_sabbath: blocked,
                    is_gap: !blocked && booked == 0,
                    coverage: (!blocked).then_some(booked),
                    morning,
                    afternoon,
                    evening,
                }
            })
            .collect())
    }
}
