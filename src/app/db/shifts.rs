use sqlx::{FromRow, SqliteExecutor};
use time::{Date, OffsetDateTime, Weekday};

use crate::app::domain::{shift_window, OrganizationId, ShiftId, ShiftWindow, StoreId};

/// Database row for shifts table. `day_of_week` is ISO (Monday = 1).
#[derive(Debug, Clone, FromRow)]
pub struct Shift {
    pub id: String,
    pub organization_id: String,
    pub store_id: String,
    pub staff_name: String,
    pub day_of_week: i64,
    pub start_minute: i64,
    pub end_minute: i64,
    pub created_at: i64,
}

impl Shift {
    pub fn weekday(&self) -> Option<Weekday> {
        shift_window::weekday_from_number(self.day_of_week)
    }
}

pub struct NewShift {
    pub id: ShiftId,
    pub organization_id: OrganizationId,
    pub store_id: StoreId,
    pub staff_name: String,
    pub day: Weekday,
    pub window: ShiftWindow,
}

pub async fn insert<'e, E>(executor: E, shift: &NewShift) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO shifts (id, organization_id, store_id, staff_name, day_of_week, start_minute, end_minute, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(shift.id.as_str())
    .bind(shift.organization_id.as_str())
    .bind(shift.store_id.as_str())
    .bind(&shift.staff_name)
    .bind(shift_window::weekday_number(shift.day))
    .bind(shift.window.start_minute() as i64)
    .bind(shift.window.end_minute() as i64)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Every shift of a store, Monday first, then by start time.
pub async fn list_for_store<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    store_id: &StoreId,
) -> Result<Vec<Shift>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Shift>(
        "SELECT id, organization_id, store_id, staff_name, day_of_week, start_minute, end_minute, created_at \
         FROM shifts WHERE organization_id = ? AND store_id = ? \
         ORDER BY day_of_week, start_minute, staff_name",
    )
    .bind(organization_id.as_str())
    .bind(store_id.as_str())
    .fetch_all(executor)
    .await
}

/// Shifts of a store that fall on the weekday of `date`, by start time.
pub async fn list_on_date<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    store_id: &StoreId,
    date: Date,
) -> Result<Vec<Shift>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Shift>(
        "SELECT id, organization_id, store_id, staff_name, day_of_week, start_minute, end_minute, created_at \
         FROM shifts WHERE organization_id = ? AND store_id = ? AND day_of_week = ? \
         ORDER BY start_minute, staff_name",
    )
    .bind(organization_id.as_str())
    .bind(store_id.as_str())
    .bind(shift_window::weekday_number(date.weekday()))
    .fetch_all(executor)
    .await
}

pub async fn delete_in_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    shift_id: &ShiftId,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM shifts WHERE id = ? AND organization_id = ?")
        .bind(shift_id.as_str())
        .bind(organization_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
