//! Notification dispatch background job.

use domain::services::WhatsAppSender;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::services::NotificationDispatcher;

use super::scheduler::{Job, JobFrequency};

/// Background job draining due notifications through the WhatsApp transport.
pub struct DispatchNotificationsJob {
    dispatcher: NotificationDispatcher,
    interval_minutes: u64,
    batch_size: i64,
}

impl DispatchNotificationsJob {
    pub fn new(
        pool: PgPool,
        sender: Arc<dyn WhatsAppSender>,
        interval_minutes: u64,
        batch_size: i64,
    ) -> Self {
        Self {
            dispatcher: NotificationDispatcher::new(pool, sender),
            interval_minutes,
            batch_size,
        }
    }
}

#[async_trait::async_trait]
impl Job for DispatchNotificationsJob {
    fn name(&self) -> &'static str {
        "dispatch_notifications"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self
            .dispatcher
            .process_pending(self.batch_size)
            .await
            .map_err(|e| format!("Failed to process pending notifications: {}", e))?;

        if summary.processed > 0 {
            info!(
                processed = summary.processed,
                sent = summary.sent,
                failed = summary.failed,
                "Processed pending notifications"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_job_frequency_follows_config() {
        let freq = JobFrequency::Minutes(5);
        assert_eq!(freq.duration(), Duration::from_secs(300));
    }
}
