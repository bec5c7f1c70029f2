//! Daily magic-link token cleanup job.

use chrono::Utc;
use domain::services::WhatsAppSender;
use sqlx::PgPool;
use std::sync::Arc;

use crate::services::MagicLinkService;

use super::scheduler::{Job, JobFrequency};

/// Background job sweeping long-expired magic-link tokens.
pub struct TokenCleanupJob {
    magic_link: MagicLinkService,
}

impl TokenCleanupJob {
    pub fn new(pool: PgPool, sender: Arc<dyn WhatsAppSender>, base_url: String) -> Self {
        Self {
            magic_link: MagicLinkService::new(pool, sender, base_url),
        }
    }
}

#[async_trait::async_trait]
impl Job for TokenCleanupJob {
    fn name(&self) -> &'static str {
        "token_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    async fn execute(&self) -> Result<(), String> {
        self.magic_link
            .cleanup(Utc::now())
            .await
            .map(|_| ())
            .map_err(|e| format!("Token cleanup failed: {}", e))
    }
}
