//! Daily gap detection background job.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use crate::services::CoverageService;

use super::scheduler::{Job, JobFrequency};

/// Background job alerting coordinators about uncovered days.
pub struct GapDetectionJob {
    coverage: CoverageService,
    horizon_days: u32,
}

impl GapDetectionJob {
    pub fn new(pool: PgPool, horizon_days: u32) -> Self {
        Self {
            coverage: CoverageService::new(pool),
            horizon_days,
        }
    }
}

#[async_trait::async_trait]
impl Job for GapDetectionJob {
    fn name(&self) -> &'static str {
        "gap_detection"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self
            .coverage
            .detect_gaps(Utc::now(), self.horizon_days)
            .await
            .map_err(|e| format!("Gap scan failed: {}", e))?;

        if summary.gaps_found > 0 {
            info!(
                gaps_found = summary.gaps_found,
                alerts_sent = summary.alerts_sent,
                "Schedule gaps detected"
            );
        }

        Ok(())
    }
}
