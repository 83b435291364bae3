use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{CustomerId, OrganizationId, StoreId, VisitId};

/// A visit joined with the names shown on the visits page.
#[derive(Debug, Clone, FromRow)]
pub struct VisitListing {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub store_name: Option<String>,
    pub visited_at: i64,
    pub amount_yen: i64,
    pub notes: String,
}

pub struct NewVisit {
    pub id: VisitId,
    pub organization_id: OrganizationId,
    pub customer_id: CustomerId,
    pub store_id: Option<StoreId>,
    pub visited_at: OffsetDateTime,
    pub amount_yen: i64,
    pub notes: String,
}

pub async fn insert<'e, E>(executor: E, visit: &NewVisit) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO visits (id, organization_id, customer_id, store_id, visited_at, amount_yen, notes, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(visit.id.as_str())
    .bind(visit.organization_id.as_str())
    .bind(visit.customer_id.as_str())
    .bind(visit.store_id.as_ref().map(|s| s.as_str()))
    .bind(visit.visited_at.unix_timestamp())
    .bind(visit.amount_yen)
    .bind(&visit.notes)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Most recent visits of an organization.
pub async fn list_recent<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    limit: i64,
) -> Result<Vec<VisitListing>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, VisitListing>(
        "SELECT v.id, v.customer_id, c.name AS customer_name, s.name AS store_name, \
                v.visited_at, v.amount_yen, v.notes \
         FROM visits v \
         JOIN customers c ON c.id = v.customer_id \
         LEFT JOIN stores s ON s.id = v.store_id \
         WHERE v.organization_id = ? \
         ORDER BY v.visited_at DESC, v.id DESC \
         LIMIT ?",
    )
    .bind(organization_id.as_str())
    .bind(limit)
    .fetch_all(executor)
    .await
}

/// Number of visits per customer of an organization.
pub async fn count_by_customer<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Vec<(String, i64)>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, (String, i64)>(
        "SELECT customer_id, count(*) FROM visits WHERE organization_id = ? GROUP BY customer_id",
    )
    .bind(organization_id.as_str())
    .fetch_all(executor)
    .await
}
