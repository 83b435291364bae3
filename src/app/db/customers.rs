use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{CustomerId, Email, OrganizationId};

/// Database row for customers table.
#[derive(Debug, Clone, FromRow)]
pub struct Customer {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: String,
    pub created_at: i64,
}

pub struct NewCustomer {
    pub id: CustomerId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub notes: String,
}

pub async fn insert<'e, E>(executor: E, customer: &NewCustomer) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO customers (id, organization_id, name, email, phone, notes, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(customer.id.as_str())
    .bind(customer.organization_id.as_str())
    .bind(&customer.name)
    .bind(customer.email.as_ref().map(|e| e.as_str()))
    .bind(customer.phone.as_deref())
    .bind(&customer.notes)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Customers of an organization, by name.
pub async fn list_for_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Vec<Customer>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Customer>(
        "SELECT id, organization_id, name, email, phone, notes, created_at FROM customers \
         WHERE organization_id = ? ORDER BY name, id",
    )
    .bind(organization_id.as_str())
    .fetch_all(executor)
    .await
}

pub async fn find_in_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    customer_id: &CustomerId,
) -> Result<Option<Customer>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Customer>(
        "SELECT id, organization_id, name, email, phone, notes, created_at FROM customers \
         WHERE id = ? AND organization_id = ?",
    )
    .bind(customer_id.as_str())
    .bind(organization_id.as_str())
    .fetch_optional(executor)
    .await
}

/// Delete a customer and, through the foreign key, their visits.
pub async fn delete_in_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    customer_id: &CustomerId,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM customers WHERE id = ? AND organization_id = ?")
        .bind(customer_id.as_str())
        .bind(organization_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
