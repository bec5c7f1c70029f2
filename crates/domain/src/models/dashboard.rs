//! Coordinator dashboard and periodic-scan summaries.

use serde::Serialize;

/// Coverage numbers for the upcoming week.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WeekCoverage {
    pub total_slots: usize,
    pub booked: usize,
    pub empty: usize,
    /// Percentage of bookable cells with a booking.
    pub coverage: u32,
}

/// Family activity numbers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FamilyActivity {
    pub total_members: usize,
    pub active_members: usize,
    pub inactive_members: usize,
}

/// Notification backlog numbers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationBacklog {
    pub pending: i64,
    pub failed: i64,
}

/// The coordinator dashboard payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CoordinatorStats {
    pub upcoming_week: WeekCoverage,
    pub family_activity: FamilyActivity,
    pub notifications: NotificationBacklog,
}

/// Result of one gap-detection scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GapScanSummary {
    pub dates_checked: usize,
    pub gaps_found: usize,
    pub alerts_sent: usize,
    pub gaps: Vec<chrono::NaiveDate>,
}

/// Result of one activity-nudge sweep.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NudgeSweepSummary {
    pub inactive_members_found: usize,
    pub nudges_sent: usize,
}
