use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{OrganizationId, StoreId};

/// Database row for stores table.
#[derive(Debug, Clone, FromRow)]
pub struct Store {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub address: String,
    pub created_at: i64,
}

pub struct NewStore {
    pub id: StoreId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub address: String,
}

pub async fn insert<'e, E>(executor: E, store: &NewStore) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO stores (id, organization_id, name, address, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(store.id.as_str())
    .bind(store.organization_id.as_str())
    .bind(&store.name)
    .bind(&store.address)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Stores of an organization, oldest first.
pub async fn list_for_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Vec<Store>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Store>(
        "SELECT id, organization_id, name, address, created_at FROM stores \
         WHERE organization_id = ? ORDER BY created_at, id",
    )
    .bind(organization_id.as_str())
    .fetch_all(executor)
    .await
}

/// Find a store, scoped to the organization. A store of another tenant is `None`.
pub async fn find_in_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    store_id: &StoreId,
) -> Result<Option<Store>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Store>(
        "SELECT id, organization_id, name, address, created_at FROM stores \
         WHERE id = ? AND organization_id = ?",
    )
    .bind(store_id.as_str())
    .bind(organization_id.as_str())
    .fetch_optional(executor)
    .await
}

/// Rename a store. Returns false when no store of this organization matched.
pub async fn rename_in_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    store_id: &StoreId,
    name: &str,
    address: &str,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE stores SET name = ?, address = ? WHERE id = ? AND organization_id = ?",
    )
    .bind(name)
    .bind(address)
    .bind(store_id.as_str())
    .bind(organization_id.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a store and, through the foreign key, its shifts.
/// Returns false when no store of this organization matched.
pub async fn delete_in_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    store_id: &StoreId,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM stores WHERE id = ? AND organization_id = ?")
        .bind(store_id.as_str())
        .bind(organization_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
