use sqlx::{FromRow, SqliteExecutor};
use time::{Date, OffsetDateTime};

use crate::app::domain::{CouponCode, CouponId, OrganizationId};

/// Database row for coupons table. `expires_on` is an ISO date (YYYY-MM-DD).
#[derive(Debug, Clone, FromRow)]
pub struct Coupon {
    pub id: String,
    pub organization_id: String,
    pub code: String,
    pub discount_percent: i64,
    pub expires_on: Option<String>,
    pub active: bool,
    pub created_at: i64,
}

pub struct NewCoupon {
    pub id: CouponId,
    pub organization_id: OrganizationId,
    pub code: CouponCode,
    pub discount_percent: u8,
    pub expires_on: Option<Date>,
}

/// Outcome of inserting a coupon.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertCoupon {
    Inserted,
    /// The organization already has a coupon with this code.
    DuplicateCode,
}

pub async fn insert<'e, E>(executor: E, coupon: &NewCoupon) -> Result<InsertCoupon, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query(
        "INSERT INTO coupons (id, organization_id, code, discount_percent, expires_on, active, created_at) \
         VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(coupon.id.as_str())
    .bind(coupon.organization_id.as_str())
    .bind(coupon.code.as_str())
    .bind(coupon.discount_percent as i64)
    .bind(coupon.expires_on.map(|d| d.to_string()))
    .bind(now)
    .execute(executor)
    .await;

    match result {
        Ok(_) => Ok(InsertCoupon::Inserted),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Ok(InsertCoupon::DuplicateCode)
        }
        Err(err) => Err(err),
    }
}

/// Coupons of an organization, newest first.
pub async fn list_for_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Vec<Coupon>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Coupon>(
        "SELECT id, organization_id, code, discount_percent, expires_on, active, created_at \
         FROM coupons WHERE organization_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(organization_id.as_str())
    .fetch_all(executor)
    .await
}

/// Flip a coupon between active and inactive.
/// Returns false when no coupon of this organization matched.
pub async fn toggle_active_in_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    coupon_id: &CouponId,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE coupons SET active = 1 - active WHERE id = ? AND organization_id = ?",
    )
    .bind(coupon_id.as_str())
    .bind(organization_id.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
