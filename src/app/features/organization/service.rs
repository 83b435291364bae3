//! Organization creation. The only place the `owner` role is ever assigned.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::app::{
    db::{self, organizations::NewOrganization, Organization},
    domain::{validation_helpers, OrganizationId, OrganizationName, OrganizationRole, UserId},
    error::AppError,
};

/// Slug for a new organization: the slugified name plus a short ULID suffix,
/// or the suffix alone when the name has no ASCII letters or digits.
pub fn organization_slug(name: &OrganizationName, id: &OrganizationId) -> String {
    let suffix = id.as_str().to_lowercase();
    let suffix = &suffix[suffix.len() - 6..];
    let base = validation_helpers::slugify(name.as_str());
    if base.is_empty() {
        format!("org-{suffix}")
    } else {
        format!("{base}-{suffix}")
    }
}

/// Create an organization with `user` as its owner.
///
/// The name is validated before anything is written. The organization row and
/// the owner membership are written in one transaction.
pub async fn create_organization(
    pool: &SqlitePool,
    user: Option<&UserId>,
    name: &str,
) -> Result<Organization, AppError> {
    let Some(user_id) = user else {
        return Err(AppError::Unauthenticated);
    };

    let name = OrganizationName::new(name).map_err(|err| {
        AppError::Validation(err.message.map(|m| m.to_string()).unwrap_or_default())
    })?;

    let id = OrganizationId::new();
    let mut slug = organization_slug(&name, &id);
    if db::organizations::slug_exists(pool, &slug).await? {
        slug = format!("{slug}-{}", OrganizationId::new().as_str().to_lowercase());
    }

    let new_org = NewOrganization {
        id: id.clone(),
        name,
        slug,
    };

    let mut tx = pool.begin().await?;
    let organization = match insert_with_owner(&mut tx, &new_org, user_id).await {
        Ok(Some(organization)) => organization,
        Ok(None) => {
            rollback(tx, &id).await;
            return Err(AppError::Internal);
        }
        Err(err) => {
            rollback(tx, &id).await;
            return Err(err.into());
        }
    };
    tx.commit().await?;

    tracing::info!(
        organization_id = %id,
        user_id = %user_id,
        slug = %organization.slug,
        "organization created"
    );

    Ok(organization)
}

/// Roll back after a failed insert. A rollback failure is logged so the
/// caller still sees the error that caused it.
async fn rollback(tx: Transaction<'_, Sqlite>, organization_id: &OrganizationId) {
    if let Err(err) = tx.rollback().await {
        tracing::error!(%organization_id, %err, "organization rollback failed");
    }
}

async fn insert_with_owner(
    conn: &mut SqliteConnection,
    organization: &NewOrganization,
    owner: &UserId,
) -> Result<Option<Organization>, sqlx::Error> {
    db::organizations::insert(&mut *conn, organization).await?;
    db::organizations::add_member(&mut *conn, &organization.id, owner, OrganizationRole::Owner).await?;
    db::organizations::find_by_id(&mut *conn, &organization.id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_uses_name_and_id_suffix() {
        let id = OrganizationId::new();
        let name = OrganizationName::new("Hair Studio Aoyama").unwrap();
        let slug = organization_slug(&name, &id);
        assert!(slug.starts_with("hair-studio-aoyama-"));
        assert!(slug.ends_with(&id.as_str().to_lowercase()[20..]));
    }

    #[test]
    fn slug_of_non_ascii_name_is_suffix_only() {
        let id = OrganizationId::new();
        let name = OrganizationName::new("美容室さくら").unwrap();
        let slug = organization_slug(&name, &id);
        assert!(slug.starts_with("org-"));
        assert_eq!(slug.len(), "org-".len() + 6);
    }
}
