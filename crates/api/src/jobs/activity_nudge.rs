//! Weekly activity nudge background job.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use crate::services::CoverageService;

use super::scheduler::{Job, JobFrequency};

/// Background job nudging family members who have not visited recently.
pub struct ActivityNudgeJob {
    coverage: CoverageService,
    threshold_days: i64,
}

impl ActivityNudgeJob {
    pub fn new(pool: PgPool, threshold_days: i64) -> Self {
        Self {
            coverage: CoverageService::new(pool),
            threshold_days,
        }
    }
}

#[async_trait::async_trait]
impl Job for ActivityNudgeJob {
    fn name(&self) -> &'static str {
        "activity_nudge"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Days(7)
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self
            .coverage
            .weekly_activity_nudge(Utc::now(), self.threshold_days)
            .await
            .map_err(|e| format!("Activity nudge sweep failed: {}", e))?;

        if summary.nudges_sent > 0 {
            info!(nudges_sent = summary.nudges_sent, "Activity nudges queued");
        }

        Ok(())
    }
}
