//! Invite repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::invite::Invite;
use domain::models::profile::Relationship;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::InviteEntity;
use crate::metrics::QueryTimer;

const INVITE_COLUMNS: &str = "id, phone, name, relationship, status, invite_code, is_admin_invite, invited_by, invited_at, accepted_at, error";

/// Repository for invite database operations.
#[derive(Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

impl InviteRepository {
    /// Creates a new InviteRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new invite.
    pub async fn create(
        &self,
        phone: &str,
        name: &str,
        relationship: Relationship,
        invite_code: &str,
        is_admin_invite: bool,
        invited_by: Option<Uuid>,
        invited_at: DateTime<Utc>,
    ) -> Result<Invite, sqlx::Error> {
        let timer = QueryTimer::new("create_invite");
        let entity = sqlx::query_as::<_, InviteEntity>(&format!(
            r#"
            INSERT INTO invites (phone, name, relationship, status, invite_code, is_admin_invite, invited_by, invited_at)
            VALUES ($1, $2, $3, 'pending', $4, $5, $6, $7)
            RETURNING {INVITE_COLUMNS}
            "#
        ))
        .bind(phone)
        .bind(name)
        .bind(relationship.as_str())
        .bind(invite_code)
        .bind(is_admin_invite)
        .bind(invited_by)
        .bind(invited_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity?.try_into()
    }

    /// Find invite by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Invite>, sqlx::Error> {
        let timer = QueryTimer::new("find_invite_by_id");
        let entity = sqlx::query_as::<_, InviteEntity>(&format!(
            r#"
            SELECT {INVITE_COLUMNS}
            FROM invites
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Find invite by phone.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Invite>, sqlx::Error> {
        let timer = QueryTimer::new("find_invite_by_phone");
        let entity = sqlx::query_as::<_, InviteEntity>(&format!(
            r#"
            SELECT {INVITE_COLUMNS}
            FROM invites
            WHERE phone = $1
            "#
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Refresh an existing invite with approved registration details,
    /// reusing the row instead of duplicating it.
    pub async fn refresh_for_approval(
        &self,
        id: Uuid,
        name: &str,
        relationship: Relationship,
        invited_by: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("refresh_invite_for_approval");
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET name = $2, relationship = $3, status = 'sent', invited_by = $4, error = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(relationship.as_str())
        .bind(invited_by)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Mark an invite as sent.
    pub async fn mark_sent(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_invite_sent");
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET status = 'sent'
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Mark an invite as failed with an error string.
    pub async fn mark_failed(&self, id: Uuid, error: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_invite_failed");
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET status = 'failed', error = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Consume an invite when the matching profile is created.
    pub async fn mark_accepted(
        &self,
        id: Uuid,
        accepted_at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_invite_accepted");
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET status = 'accepted', accepted_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(accepted_at)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Reset an invite for resending.
    pub async fn reset_for_resend(
        &self,
        id: Uuid,
        invited_at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("reset_invite_for_resend");
        let result = sqlx::query(
            r#"
            UPDATE invites
            SET status = 'pending', error = NULL, invited_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(invited_at)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// List all invites, newest first.
    pub async fn list_all(&self) -> Result<Vec<Invite>, sqlx::Error> {
        let timer = QueryTimer::new("list_invites");
        let entities = sqlx::query_as::<_, InviteEntity>(&format!(
            r#"
            SELECT {INVITE_COLUMNS}
            FROM invites
            ORDER BY invited_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete an invite.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_invite");
        let result = sqlx::query(
            r#"
            DELETE FROM invites
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // Note: InviteRepository tests require a database connection and are
    // covered by integration tests.
}
