//! Magic-link token repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::magic_link::MagicLinkToken;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::MagicLinkTokenEntity;
use crate::metrics::QueryTimer;

const TOKEN_COLUMNS: &str = "id, phone, token, expires_at, used, return_url, created_at";

/// Repository for magic-link token database operations.
#[derive(Clone)]
pub struct MagicLinkTokenRepository {
    pool: PgPool,
}

impl MagicLinkTokenRepository {
    /// Creates a new MagicLinkTokenRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete every token for a phone. Issuing a new token calls this
    /// first, keeping at most one live token per phone.
    pub async fn delete_for_phone(&self, phone: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_tokens_for_phone");
        let result = sqlx::query(
            r#"
            DELETE FROM magic_link_tokens
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Insert a fresh token.
    pub async fn insert(
        &self,
        phone: &str,
        token: &str,
        expires_at: DateTime<Utc>,
        return_url: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<MagicLinkToken, sqlx::Error> {
        let timer = QueryTimer::new("insert_magic_link_token");
        let entity = sqlx::query_as::<_, MagicLinkTokenEntity>(&format!(
            r#"
            INSERT INTO magic_link_tokens (phone, token, expires_at, used, return_url, created_at)
            VALUES ($1, $2, $3, FALSE, $4, $5)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(phone)
        .bind(token)
        .bind(expires_at)
        .bind(return_url)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(entity?.into())
    }

    /// Find a token row by its opaque token string.
    pub async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<MagicLinkToken>, sqlx::Error> {
        let timer = QueryTimer::new("find_magic_link_token");
        let entity = sqlx::query_as::<_, MagicLinkTokenEntity>(&format!(
            r#"
            SELECT {TOKEN_COLUMNS}
            FROM magic_link_tokens
            WHERE token = $1
            "#
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(entity?.map(Into::into))
    }

    /// Flip `used` exactly once. Conditional on the token being unused, so
    /// of two concurrent consumers exactly one sees a row change; the other
    /// observes an already-used token.
    pub async fn mark_used(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_magic_link_token_used");
        let result = sqlx::query(
            r#"
            UPDATE magic_link_tokens
            SET used = TRUE
            WHERE id = $1 AND used = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Delete tokens whose expiry passed before the cutoff (storage hygiene).
    pub async fn delete_expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("cleanup_magic_link_tokens");
        let result = sqlx::query(
            r#"
            DELETE FROM magic_link_tokens
            WHERE expires_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // Note: MagicLinkTokenRepository tests require a database connection and
    // are covered by integration tests.
}
