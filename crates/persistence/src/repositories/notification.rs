//! Notification repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::notification::{
    Notification, NotificationStatus, NotificationType, NotificationWithProfile,
    PendingNotification,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{NotificationEntity, PendingNotificationEntity};
use crate::metrics::QueryTimer;

const NOTIFICATION_COLUMNS: &str = "id, profile_id, notification_type, status, scheduled_for, sent_at, provider_message_id, visit_slot_id, message, error, created_at";

const ENRICHED_SELECT: &str = r#"
    SELECT
        n.id, n.profile_id, n.notification_type, n.status, n.scheduled_for,
        n.sent_at, n.provider_message_id, n.visit_slot_id, n.message, n.error,
        n.created_at,
        p.phone AS recipient_phone, p.name AS recipient_name,
        p.hebrew_name AS recipient_hebrew_name, p.relationship AS recipient_relationship,
        p.is_admin AS recipient_is_admin, p.last_visit_at AS recipient_last_visit_at,
        p.created_at AS recipient_created_at, p.updated_at AS recipient_updated_at,
        s.date AS slot_date, s.time_of_day AS slot_time_of_day,
        s.booked_by AS slot_booked_by, s.booked_at AS slot_booked_at,
        s.notes AS slot_notes, s.is_sabbath AS slot_is_sabbath,
        s.is_holiday AS slot_is_holiday, s.holiday_name AS slot_holiday_name,
        s.created_at AS slot_created_at
    FROM notifications n
    LEFT JOIN family_profiles p ON n.profile_id = p.id
    LEFT JOIN visit_slots s ON n.visit_slot_id = s.id
"#;

/// Repository for notification-queue database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enqueue a notification (status `pending`).
    pub async fn enqueue(
        &self,
        profile_id: Uuid,
        notification_type: NotificationType,
        scheduled_for: DateTime<Utc>,
        visit_slot_id: Option<Uuid>,
        message: Option<&str>,
    ) -> Result<Notification, sqlx::Error> {
        let timer = QueryTimer::new("enqueue_notification");
        let entity = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            INSERT INTO notifications (profile_id, notification_type, status, scheduled_for, visit_slot_id, message)
            VALUES ($1, $2, 'pending', $3, $4, $5)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(profile_id)
        .bind(notification_type.as_str())
        .bind(scheduled_for)
        .bind(visit_slot_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        entity?.try_into()
    }

    /// Whether a reminder already exists for this profile+slot pair.
    pub async fn reminder_exists(
        &self,
        profile_id: Uuid,
        visit_slot_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("reminder_exists");
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notifications
                WHERE profile_id = $1
                  AND visit_slot_id = $2
                  AND notification_type = 'reminder'
            )
            "#,
        )
        .bind(profile_id)
        .bind(visit_slot_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        exists
    }

    /// Due pending notifications, enriched with recipient and linked slot.
    ///
    /// No ordering beyond the due-time filter is guaranteed.
    pub async fn find_due_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PendingNotification>, sqlx::Error> {
        let timer = QueryTimer::new("find_due_pending_notifications");
        let entities = sqlx::query_as::<_, PendingNotificationEntity>(&format!(
            r#"
            {ENRICHED_SELECT}
            WHERE n.status = 'pending' AND n.scheduled_for <= $1
            LIMIT $2
            "#
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// Find notification by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, sqlx::Error> {
        let timer = QueryTimer::new("find_notification_by_id");
        let entity = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Mark a notification as sent with the provider message id.
    pub async fn mark_sent(
        &self,
        id: Uuid,
        provider_message_id: Option<&str>,
        sent_at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_notification_sent");
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET status = 'sent', provider_message_id = $2, sent_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(provider_message_id)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Mark a notification as failed with an error string.
    pub async fn mark_failed(&self, id: Uuid, error: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_notification_failed");
        let result = sqlx::query(
            r#"
            UPDATE notifications
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

    /// Hard-delete a notification, only while still pending.
    pub async fn delete_pending(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_pending_notification");
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// A profile's notification history, newest first.
    pub async fn list_for_profile(
        &self,
        profile_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let timer = QueryTimer::new("list_notifications_for_profile");
        let entities = sqlx::query_as::<_, NotificationEntity>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE profile_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(profile_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// Full notification history with recipients, optionally filtered by
    /// status, newest first.
    pub async fn list_all(
        &self,
        status: Option<NotificationStatus>,
        limit: i64,
    ) -> Result<Vec<NotificationWithProfile>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_notifications");
        let entities = match status {
            Some(status) => {
                sqlx::query_as::<_, PendingNotificationEntity>(&format!(
                    r#"
                    {ENRICHED_SELECT}
                    WHERE n.status = $1
                    ORDER BY n.created_at DESC
                    LIMIT $2
                    "#
                ))
                .bind(status.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, PendingNotificationEntity>(&format!(
                    r#"
                    {ENRICHED_SELECT}
                    ORDER BY n.created_at DESC
                    LIMIT $1
                    "#
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        };
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// Count notifications in a status (dashboard backlog numbers).
    pub async fn count_by_status(
        &self,
        status: NotificationStatus,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_notifications_by_status");
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM notifications WHERE status = $1
            "#,
        )
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        count
    }
}
