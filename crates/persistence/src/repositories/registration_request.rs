//! Registration request repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::profile::Relationship;
use domain::models::registration::RegistrationRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::RegistrationRequestEntity;
use crate::metrics::QueryTimer;

const REQUEST_COLUMNS: &str =
    "id, phone, name, relationship, status, approved_by, approved_at, created_at, updated_at";

/// Repository for registration-request database operations.
#[derive(Clone)]
pub struct RegistrationRequestRepository {
    pool: PgPool,
}

impl RegistrationRequestRepository {
    /// Creates a new RegistrationRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the request for a phone, whatever its state.
    pub async fn find_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<RegistrationRequest>, sqlx::Error> {
        let timer = QueryTimer::new("find_registration_by_phone");
        let entity = sqlx::query_as::<_, RegistrationRequestEntity>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM registration_requests
            WHERE phone = $1
            "#
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Find a request awaiting coordinator approval for a phone.
    pub async fn find_pending_approval_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<RegistrationRequest>, sqlx::Error> {
        let timer = QueryTimer::new("find_pending_approval_by_phone");
        let entity = sqlx::query_as::<_, RegistrationRequestEntity>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM registration_requests
            WHERE phone = $1 AND status = 'pending_approval'
            "#
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Start a conversation for a phone. An existing row (e.g. a cleared
    /// terminal state) is reset to the beginning of the dialogue.
    pub async fn create_or_reset(
        &self,
        phone: &str,
        now: DateTime<Utc>,
    ) -> Result<RegistrationRequest, sqlx::Error> {
        let timer = QueryTimer::new("create_registration_request");
        let entity = sqlx::query_as::<_, RegistrationRequestEntity>(&format!(
            r#"
            INSERT INTO registration_requests (phone, status, created_at, updated_at)
            VALUES ($1, 'pending_details', $2, $2)
            ON CONFLICT (phone) DO UPDATE
            SET status = 'pending_details', updated_at = $2
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity?.try_into()
    }

    /// Store the collected name.
    pub async fn set_name(
        &self,
        id: Uuid,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_registration_name");
        let result = sqlx::query(
            r#"
            UPDATE registration_requests
            SET name = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Store the collected relationship and move to coordinator approval.
    pub async fn set_relationship(
        &self,
        id: Uuid,
        relationship: Relationship,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_registration_relationship");
        let result = sqlx::query(
            r#"
            UPDATE registration_requests
            SET relationship = $2, status = 'pending_approval', updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(relationship.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Approve a request. Conditional on it still awaiting approval, so a
    /// repeated approve command is a no-op.
    pub async fn approve(
        &self,
        id: Uuid,
        approver_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("approve_registration");
        let result = sqlx::query(
            r#"
            UPDATE registration_requests
            SET status = 'approved', approved_by = $2, approved_at = $3, updated_at = $3
            WHERE id = $1 AND status = 'pending_approval'
            "#,
        )
        .bind(id)
        .bind(approver_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Reject whatever request exists for a phone.
    pub async fn reject_by_phone(
        &self,
        phone: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("reject_registration");
        let result = sqlx::query(
            r#"
            UPDATE registration_requests
            SET status = 'rejected', updated_at = $2
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // Note: RegistrationRequestRepository tests require a database
    // connection and are covered by integration tests.
}
