//! Magic-link token lifecycle.
//!
//! Issues single-use login tokens, delivers them over WhatsApp, validates
//! and consumes them, and sweeps expired rows.

use chrono::{DateTime, Utc};
use domain::models::magic_link::{
    cleanup_cutoff, expiry_from, ConsumedToken, MagicLinkToken, TokenValidation,
};
use domain::services::dialogue;
use domain::services::WhatsAppSender;
use persistence::repositories::MagicLinkTokenRepository;
use shared::crypto::generate_magic_link_token;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Service owning the magic-link token lifecycle.
pub struct MagicLinkService {
    repo: MagicLinkTokenRepository,
    sender: Arc<dyn WhatsAppSender>,
    base_url: String,
}

impl MagicLinkService {
    pub fn new(pool: PgPool, sender: Arc<dyn WhatsAppSender>, base_url: String) -> Self {
        Self {
            repo: MagicLinkTokenRepository::new(pool),
            sender,
            base_url,
        }
    }

    /// Issue a fresh token for a phone, invalidating all prior tokens.
    pub async fn issue(
        &self,
        phone: &str,
        return_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<MagicLinkToken, sqlx::Error> {
        let invalidated = self.repo.delete_for_phone(phone).await?;
        if invalidated > 0 {
            info!(phone = %phone, invalidated, "Invalidated prior magic-link tokens");
        }

        let token = generate_magic_link_token();
        self.repo
            .insert(phone, &token, expiry_from(now), return_url, now)
            .await
    }

    /// Store an externally generated token (internal endpoint), enforcing
    /// the single-live-token rule the same way as `issue`.
    pub async fn store(
        &self,
        phone: &str,
        token: &str,
        return_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<MagicLinkToken, sqlx::Error> {
        self.repo.delete_for_phone(phone).await?;
        self.repo
            .insert(phone, token, expiry_from(now), return_url, now)
            .await
    }

    /// Issue a token and deliver the login link over WhatsApp. Returns
    /// whether the delivery succeeded; on failure a plain fallback message
    /// pointing at the site is attempted instead.
    pub async fn issue_and_send(
        &self,
        phone: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let token = self.issue(phone, None, now).await?;
        let url = format!("{}/auth/magic-link?token={}", self.base_url, token.token);
        let outcome = self
            .sender
            .send_text(phone, &dialogue::magic_link_body(&url))
            .await;

        if outcome.is_sent() {
            info!(phone = %phone, "Magic link sent");
            Ok(true)
        } else {
            warn!(phone = %phone, outcome = ?outcome, "Magic link send failed, sending fallback");
            self.sender
                .send_text(phone, &dialogue::login_fallback(&self.base_url))
                .await;
            Ok(false)
        }
    }

    /// Read-only validation; safe to poll repeatedly.
    pub async fn validate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenValidation, sqlx::Error> {
        let row = self.repo.find_by_token(token).await?;
        Ok(TokenValidation::evaluate(row.as_ref(), now))
    }

    /// Consume a token exactly once.
    ///
    /// The `used` flip is conditional at the store level, so a concurrent
    /// duplicate consumption observes `AlreadyUsed` rather than a second
    /// success.
    pub async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Result<ConsumedToken, TokenValidation>, sqlx::Error> {
        let row = self.repo.find_by_token(token).await?;
        let validation = TokenValidation::evaluate(row.as_ref(), now);

        let row = match (validation, row) {
            (TokenValidation::Valid { .. }, Some(row)) => row,
            (other, _) => return Ok(Err(other)),
        };

        if self.repo.mark_used(row.id).await? == 0 {
            // Lost the race with another consumer.
            return Ok(Err(TokenValidation::AlreadyUsed));
        }

        info!(phone = %row.phone, "Magic-link token consumed");
        Ok(Ok(ConsumedToken {
            phone: row.phone,
            code: row.token,
            return_url: row.return_url,
        }))
    }

    /// Delete tokens expired long enough ago to be useless even for error
    /// messages. Returns the number removed.
    pub async fn cleanup(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let deleted = self.repo.delete_expired_before(cleanup_cutoff(now)).await?;
        if deleted > 0 {
            info!(deleted, "Cleaned up expired magic-link tokens");
        }
        Ok(deleted)
    }
}
