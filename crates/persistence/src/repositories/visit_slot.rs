//! Visit slot repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::visit_slot::{ScheduleSlot, TimeOfDay, VisitSlot};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ScheduleSlotEntity, VisitSlotEntity};
use crate::metrics::QueryTimer;

const SLOT_COLUMNS: &str = "id, date, time_of_day, booked_by, booked_at, notes, is_sabbath, is_holiday, holiday_name, created_at";

const SCHEDULE_SELECT: &str = r#"
    SELECT
        s.id, s.date, s.time_of_day, s.booked_by, s.booked_at, s.notes,
        s.is_sabbath, s.is_holiday, s.holiday_name, s.created_at,
        p.id AS booker_id, p.phone AS booker_phone, p.name AS booker_name,
        p.hebrew_name AS booker_hebrew_name, p.relationship AS booker_relationship,
        p.is_admin AS booker_is_admin, p.last_visit_at AS booker_last_visit_at,
        p.created_at AS booker_created_at, p.updated_at AS booker_updated_at
    FROM visit_slots s
    LEFT JOIN family_profiles p ON s.booked_by = p.id
"#;

/// Repository for visit-slot database operations.
#[derive(Clone)]
pub struct VisitSlotRepository {
    pool: PgPool,
}

impl VisitSlotRepository {
    /// Creates a new VisitSlotRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Book a (date, time-of-day) cell for a profile.
    ///
    /// Creates the row lazily on first booking, or takes over an existing
    /// unbooked row. The write is conditional on the cell being free, so a
    /// concurrent booking of the same cell sees `None` and surfaces a
    /// conflict instead of silently double-booking.
    #[allow(clippy::too_many_arguments)]
    pub async fn book(
        &self,
        date: NaiveDate,
        time_of_day: TimeOfDay,
        profile_id: Uuid,
        booked_at: DateTime<Utc>,
        notes: Option<&str>,
        is_sabbath: bool,
        is_holiday: bool,
        holiday_name: Option<&str>,
    ) -> Result<Option<VisitSlot>, sqlx::Error> {
        let timer = QueryTimer::new("book_slot");
        let entity = sqlx::query_as::<_, VisitSlotEntity>(&format!(
            r#"
            INSERT INTO visit_slots (date, time_of_day, booked_by, booked_at, notes, is_sabbath, is_holiday, holiday_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (date, time_of_day) DO UPDATE
            SET booked_by = EXCLUDED.booked_by,
                booked_at = EXCLUDED.booked_at,
                notes = EXCLUDED.notes
            WHERE visit_slots.booked_by IS NULL
            RETURNING {SLOT_COLUMNS}
            "#
        ))
        .bind(date)
        .bind(time_of_day.as_str())
        .bind(profile_id)
        .bind(booked_at)
        .bind(notes)
        .bind(is_sabbath)
        .bind(is_holiday)
        .bind(holiday_name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Clear a slot's booking fields, keeping the row as an audit artifact.
    pub async fn clear_booking(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("clear_slot_booking");
        let result = sqlx::query(
            r#"
            UPDATE visit_slots
            SET booked_by = NULL, booked_at = NULL, notes = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Find slot by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VisitSlot>, sqlx::Error> {
        let timer = QueryTimer::new("find_slot_by_id");
        let entity = sqlx::query_as::<_, VisitSlotEntity>(&format!(
            r#"
            SELECT {SLOT_COLUMNS}
            FROM visit_slots
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Point lookup for one calendar cell.
    pub async fn find_by_date_and_time(
        &self,
        date: NaiveDate,
        time_of_day: TimeOfDay,
    ) -> Result<Option<VisitSlot>, sqlx::Error> {
        let timer = QueryTimer::new("find_slot_by_date_time");
        let entity = sqlx::query_as::<_, VisitSlotEntity>(&format!(
            r#"
            SELECT {SLOT_COLUMNS}
            FROM visit_slots
            WHERE date = $1 AND time_of_day = $2
            "#
        ))
        .bind(date)
        .bind(time_of_day.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        entity?.map(TryInto::try_into).transpose()
    }

    /// Slots in a date range, enriched with booker profiles.
    pub async fn list_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<ScheduleSlot>, sqlx::Error> {
        let timer = QueryTimer::new("list_slots_range");
        let entities = sqlx::query_as::<_, ScheduleSlotEntity>(&format!(
            r#"
            {SCHEDULE_SELECT}
            WHERE s.date >= $1 AND s.date <= $2
            ORDER BY s.date, s.time_of_day
            "#
        ))
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// All slots for one date, enriched with booker profiles.
    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<ScheduleSlot>, sqlx::Error> {
        let timer = QueryTimer::new("list_slots_by_date");
        let entities = sqlx::query_as::<_, ScheduleSlotEntity>(&format!(
            r#"
            {SCHEDULE_SELECT}
            WHERE s.date = $1
            ORDER BY s.time_of_day
            "#
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// A profile's booked slots, newest first.
    pub async fn list_booked_by(&self, profile_id: Uuid) -> Result<Vec<VisitSlot>, sqlx::Error> {
        let timer = QueryTimer::new("list_slots_booked_by");
        let entities = sqlx::query_as::<_, VisitSlotEntity>(&format!(
            r#"
            SELECT {SLOT_COLUMNS}
            FROM visit_slots
            WHERE booked_by = $1
            ORDER BY date DESC
            "#
        ))
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        entities?.into_iter().map(TryInto::try_into).collect()
    }

    /// Booking counts per profile across all slots.
    pub async fn booking_counts(&self) -> Result<Vec<(Uuid, i64)>, sqlx::Error> {
        let timer = QueryTimer::new("slot_booking_counts");
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT booked_by, COUNT(*)
            FROM visit_slots
            WHERE booked_by IS NOT NULL
            GROUP BY booked_by
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        rows
    }
}

#[cfg(test)]
mod tests {
    // Note: VisitSlotRepository tests require a database connection and are
    // covered by integration tests.
}
