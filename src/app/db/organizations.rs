use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{Branding, OrganizationId, OrganizationName, OrganizationRole, UserId};

/// Plan assigned to every new organization.
pub const DEFAULT_PLAN: &str = "free";

/// Database row for organizations table.
#[derive(Debug, Clone, FromRow)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub plan: String,
    pub branding: String,
    pub white_label: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Organization {
    pub fn branding(&self) -> Branding {
        Branding::from_json(&self.branding)
    }
}

/// An organization together with the caller's role in it.
#[derive(Debug, Clone)]
pub struct OrganizationMembership {
    pub organization: Organization,
    pub role: OrganizationRole,
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    #[sqlx(flatten)]
    organization: Organization,
    role: String,
}

/// Data structure for inserting a new organization.
/// Plan, branding and white-label always start at their defaults.
pub struct NewOrganization {
    pub id: OrganizationId,
    pub name: OrganizationName,
    pub slug: String,
}

const ORGANIZATION_COLUMNS: &str =
    "o.id, o.name, o.slug, o.plan, o.branding, o.white_label, o.created_at, o.updated_at";

/// Find an organization by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(&format!(
        "SELECT {ORGANIZATION_COLUMNS} FROM organizations o WHERE o.id = ?"
    ))
    .bind(organization_id.as_str())
    .fetch_optional(executor)
    .await
}

/// Insert a new organization.
pub async fn insert<'e, E>(
    executor: E,
    organization: &NewOrganization,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organizations (id, name, slug, plan, branding, white_label, created_at, updated_at) \
         VALUES (?, ?, ?, ?, '{}', 0, ?, ?)",
    )
    .bind(organization.id.as_str())
    .bind(organization.name.as_str())
    .bind(&organization.slug)
    .bind(DEFAULT_PLAN)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Whether a slug is already taken.
pub async fn slug_exists<'e, E>(executor: E, slug: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM organizations WHERE slug = ?")
        .bind(slug)
        .fetch_one(executor)
        .await?;
    Ok(count > 0)
}

/// Update the name and branding of an organization.
pub async fn update_settings<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    name: &OrganizationName,
    branding: &Branding,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query(
        "UPDATE organizations SET name = ?, branding = ?, updated_at = ? WHERE id = ?",
    )
    .bind(name.as_str())
    .bind(branding.to_json())
    .bind(now)
    .bind(organization_id.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Add a user to an organization with a specific role.
pub async fn add_member<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
    role: OrganizationRole,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organization_members (organization_id, user_id, role, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .bind(role.to_string())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find a member's role in an organization. Returns None if not a member
/// or if the stored role is not one this build recognizes.
pub async fn find_member_role<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<Option<OrganizationRole>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let row: Option<String> = sqlx::query_scalar(
        "SELECT role FROM organization_members WHERE organization_id = ? AND user_id = ?",
    )
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .fetch_optional(executor)
    .await?;

    Ok(row.and_then(|r| r.parse::<OrganizationRole>().ok()))
}

/// All organizations the user belongs to with the user's role in each,
/// most recently created first.
pub async fn list_for_user<'e, E>(
    executor: E,
    user_id: &UserId,
) -> Result<Vec<OrganizationMembership>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, MembershipRow>(&format!(
        "SELECT {ORGANIZATION_COLUMNS}, m.role \
         FROM organization_members m \
         JOIN organizations o ON o.id = m.organization_id \
         WHERE m.user_id = ? \
         ORDER BY o.created_at DESC, o.id DESC"
    ))
    .bind(user_id.as_str())
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| match row.role.parse::<OrganizationRole>() {
            Ok(role) => Some(OrganizationMembership {
                organization: row.organization,
                role,
            }),
            Err(_) => {
                tracing::warn!(
                    organization_id = %row.organization.id,
                    role = %row.role,
                    "skipping membership with unrecognized role"
                );
                None
            }
        })
        .collect())
}

/// Member listing for the settings page.
#[derive(Debug, FromRow)]
pub struct MemberWithEmail {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

/// All members of an organization with their email, owners first.
pub async fn list_members_with_email<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Vec<MemberWithEmail>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, MemberWithEmail>(
        "SELECT m.user_id, u.email, m.role \
         FROM organization_members m JOIN users u ON u.id = m.user_id \
         WHERE m.organization_id = ? \
         ORDER BY CASE m.role WHEN 'owner' THEN 0 WHEN 'admin' THEN 1 ELSE 2 END, u.email",
    )
    .bind(organization_id.as_str())
    .fetch_all(executor)
    .await
}
