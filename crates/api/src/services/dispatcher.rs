//! Notification queue dispatcher.
//!
//! Drains due pending notifications and performs exactly one external send
//! and one store write per item. Individual failures are recorded on the
//! notification row and never abort the cycle.

use chrono::Utc;
use domain::models::notification::{DispatchSummary, PendingNotification};
use domain::services::templates::{self, MessagePlan};
use domain::services::{SendOutcome, WhatsAppSender};
use persistence::repositories::NotificationRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Dispatches queued notifications through the WhatsApp transport.
pub struct NotificationDispatcher {
    repo: NotificationRepository,
    sender: Arc<dyn WhatsAppSender>,
}

impl NotificationDispatcher {
    pub fn new(pool: PgPool, sender: Arc<dyn WhatsAppSender>) -> Self {
        Self {
            repo: NotificationRepository::new(pool),
            sender,
        }
    }

    /// One dispatch cycle: drain due items and send each.
    pub async fn process_pending(&self, limit: i64) -> Result<DispatchSummary, sqlx::Error> {
        let now = Utc::now();
        let due = self.repo.find_due_pending(now, limit).await?;

        let mut summary = DispatchSummary {
            processed: due.len(),
            ..DispatchSummary::default()
        };

        for pending in &due {
            match self.dispatch_one(pending).await {
                Ok(true) => summary.sent += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    // A store error on one item must not starve the rest of
                    // the batch.
                    error!(
                        notification_id = %pending.notification.id,
                        error = %e,
                        "Store write failed while dispatching notification"
                    );
                    summary.failed += 1;
                }
            }
        }

        if summary.processed > 0 {
            info!(
                processed = summary.processed,
                sent = summary.sent,
                failed = summary.failed,
                "Dispatch cycle complete"
            );
        }

        Ok(summary)
    }

    /// Send one notification and record the outcome. Returns whether the
    /// provider accepted it.
    pub async fn dispatch_one(
        &self,
        pending: &PendingNotification,
    ) -> Result<bool, sqlx::Error> {
        let notification = &pending.notification;

        let Some(phone) = pending.profile.as_ref().map(|p| p.phone.clone()) else {
            self.repo
                .mark_failed(notification.id, "No phone number")
                .await?;
            return Ok(false);
        };

        let plan = match templates::plan(pending) {
            Ok(plan) => plan,
            Err(reason) => {
                warn!(
                    notification_id = %notification.id,
                    reason = %reason,
                    "Notification cannot be rendered"
                );
                self.repo.mark_failed(notification.id, &reason).await?;
                return Ok(false);
            }
        };

        let outcome = match plan {
            MessagePlan::Template(template, variables) => {
                self.sender.send_template(&phone, template, variables).await
            }
            MessagePlan::Text(body) => self.sender.send_text(&phone, &body).await,
        };

        match outcome {
            SendOutcome::Sent { message_sid } => {
                self.repo
                    .mark_sent(notification.id, Some(&message_sid), Utc::now())
                    .await?;
                Ok(true)
            }
            SendOutcome::Failed(reason) => {
                self.repo.mark_failed(notification.id, &reason).await?;
                Ok(false)
            }
            SendOutcome::NotConfigured => {
                self.repo
                    .mark_failed(notification.id, "WhatsApp credentials not configured")
                    .await?;
                Ok(false)
            }
        }
    }
}
