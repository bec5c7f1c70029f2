//! Family profile repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::profile::{FamilyProfile, Relationship};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::FamilyProfileEntity;
use crate::metrics::QueryTimer;

const PROFILE_COLUMNS: &str =
    "id, phone, name, hebrew_name, relationship, is_admin, last_visit_at, created_at, updated_at";

/// Repository for family-profile database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new profile.
    pub async fn create(
        &self,
        phone: &str,
        name: &str,
        hebrew_name: Option<&str>,
        relationship: Relationship,
        is_admin: bool,
    ) -> Result<FamilyProfile, sqlx::Error> {
        let timer = QueryTimer::new("create_profile");
        let entity = sqlx::query_as::<_, FamilyProfileEntity>(&format!(
            r#"
            INSERT INTO family_profiles (phone, name, hebrew_name, relationship, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(phone)
        .bind(name)
        .bind(hebrew_name)
        .bind(relationship.as_str())
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity?.try_into()
    }

    /// Update an existing profile's editable fields.
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        hebrew_name: Option<&str>,
        relationship: Relationship,
    ) -> Result<Option<FamilyProfile>, sqlx::Error> {
        let timer = QueryTimer::new("update_profile");
        let entity = sqlx::query_as::<_, FamilyProfileEntity>(&format!(
            r#"
            UPDATE family_profiles
            SET name = $2, hebrew_name = $3, relationship = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(hebrew_name)
        .bind(relationship.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Find profile by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FamilyProfile>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_id");
        let entity = sqlx::query_as::<_, FamilyProfileEntity>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM family_profiles
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Find a profile whose stored phone matches any of the lookup variants.
    pub async fn find_by_phone_variants(
        &self,
        variants: &[String],
    ) -> Result<Option<FamilyProfile>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_phone");
        let entity = sqlx::query_as::<_, FamilyProfileEntity>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM family_profiles
            WHERE phone = ANY($1)
            LIMIT 1
            "#
        ))
        .bind(variants)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// List all profiles.
    pub async fn list_all(&self) -> Result<Vec<FamilyProfile>, sqlx::Error> {
        let timer = QueryTimer::new("list_profiles");
        let entities = sqlx::query_as::<_, FamilyProfileEntity>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM family_profiles
            ORDER BY created_at
            "#
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// List all administrator profiles (gap alerts fan out to these).
    pub async fn list_admins(&self) -> Result<Vec<FamilyProfile>, sqlx::Error> {
        let timer = QueryTimer::new("list_admin_profiles");
        let entities = sqlx::query_as::<_, FamilyProfileEntity>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM family_profiles
            WHERE is_admin = TRUE
            ORDER BY created_at
            "#
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// List non-administrator profiles with no visit since the cutoff.
    pub async fn list_inactive(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FamilyProfile>, sqlx::Error> {
        let timer = QueryTimer::new("list_inactive_profiles");
        let entities = sqlx::query_as::<_, FamilyProfileEntity>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM family_profiles
            WHERE is_admin = FALSE
              AND (last_visit_at IS NULL OR last_visit_at < $1)
            ORDER BY created_at
            "#
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// Toggle the administrator flag.
    pub async fn set_admin(&self, id: Uuid, is_admin: bool) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_profile_admin");
        let result = sqlx::query(
            r#"
            UPDATE family_profiles
            SET is_admin = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(is_admin)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Stamp the last-visit time (called by the booking engine).
    pub async fn touch_last_visit(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("touch_profile_last_visit");
        let result = sqlx::query(
            r#"
            UPDATE family_profiles
            SET last_visit_at = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Delete a profile (administrator action).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_profile");
        let result = sqlx::query(
            r#"
            DELETE FROM family_profiles
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
    // Note: ProfileRepository tests require a database connection and are
    // covered by integration tests.
}
