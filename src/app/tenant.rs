//! Tenant context resolution and tenant-scoped authorization.
//!
//! **Rule**: never trust the active-organization cookie or any client-held
//! role. Membership and role are fetched from the database within the request
//! that uses them.

use crate::app::{
    backend, db,
    db::OrganizationMembership,
    domain::{OrganizationId, OrganizationRole, Permission, UserId},
    error::AppError,
    rbac,
    session::SessionContext,
    AppState,
};

/// The organization a request operates against, with the caller's role in it.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub current: OrganizationMembership,
    /// Every organization the user belongs to, most recently created first.
    pub memberships: Vec<OrganizationMembership>,
}

impl TenantContext {
    pub fn role(&self) -> OrganizationRole {
        self.current.role
    }

    pub fn can(&self, permission: Permission) -> bool {
        rbac::has_permission(self.current.role, permission)
    }

    /// `Unauthorized` unless the current role grants `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::info!(
                user_id = %self.user_id,
                organization_id = %self.organization_id,
                role = %self.current.role,
                %permission,
                "permission denied"
            );
            Err(AppError::Unauthorized)
        }
    }
}

/// Pick the current organization from a preference and the user's memberships.
///
/// `memberships` must be ordered most recently created first.
/// 1. A preference matching a membership wins.
/// 2. A stale preference falls back to `fallback` when the user belongs to it,
///    otherwise to the first membership.
/// 3. No preference selects the first membership.
/// 4. No memberships selects nothing.
pub fn select_current<'a>(
    preference: Option<&str>,
    memberships: &'a [OrganizationMembership],
    fallback: Option<&OrganizationId>,
) -> Option<&'a OrganizationMembership> {
    match preference {
        Some(preferred) => memberships
            .iter()
            .find(|m| m.organization.id == preferred)
            .or_else(|| {
                fallback
                    .and_then(|fb| {
                        let fb = fb.as_str();
                        memberships.iter().find(|m| m.organization.id == fb)
                    })
                    .or_else(|| memberships.first())
            }),
        None => memberships.first(),
    }
}

/// Resolve the current organization, surfacing backend failures.
/// Use on write paths.
pub async fn resolve(
    state: &AppState,
    session: &SessionContext,
) -> Result<Option<TenantContext>, AppError> {
    // Preference is taken from the session before memberships are consulted.
    let preference = session.organization_preference.as_deref();

    let memberships = backend::bounded(
        state.config.backend_timeout,
        db::organizations::list_for_user(&state.db, &session.user_id),
    )
    .await?;

    let Some(current) = select_current(
        preference,
        &memberships,
        state.config.default_organization_id.as_ref(),
    )
    .cloned() else {
        return Ok(None);
    };

    if preference.is_some_and(|p| p != current.organization.id) {
        tracing::debug!(
            user_id = %session.user_id,
            stale_preference = preference,
            organization_id = %current.organization.id,
            "active organization preference did not match a membership"
        );
    }

    let organization_id = OrganizationId::from_string(&current.organization.id).map_err(|_| {
        tracing::error!(organization_id = %current.organization.id, "stored organization id is not a ULID");
        AppError::Internal
    })?;

    Ok(Some(TenantContext {
        user_id: session.user_id.clone(),
        organization_id,
        current,
        memberships,
    }))
}

/// Resolve the current organization for a read path. Backend failures are
/// logged and reported as "no organization resolved".
pub async fn resolve_or_none(state: &AppState, session: &SessionContext) -> Option<TenantContext> {
    match resolve(state, session).await {
        Ok(context) => context,
        Err(err) => {
            tracing::error!(user_id = %session.user_id, %err, "tenant context resolution failed");
            None
        }
    }
}

/// Resolve the current organization and require a permission in it.
/// No organization at all is `NotFound`.
pub async fn authorize(
    state: &AppState,
    session: &SessionContext,
    permission: Permission,
) -> Result<TenantContext, AppError> {
    let context = resolve(state, session).await?.ok_or(AppError::NotFound)?;
    context.require(permission)?;
    Ok(context)
}

/// Validates that the user is a member of the organisation. Returns the member's role.
///
/// Returns `NotFound` (not `Unauthorized`) to avoid leaking whether the org exists.
pub async fn require_org_member(
    state: &AppState,
    user_id: &UserId,
    organization_id: &str,
) -> Result<OrganizationRole, AppError> {
    let organization_id = OrganizationId::from_string(organization_id).map_err(|_| AppError::NotFound)?;

    backend::bounded(
        state.config.backend_timeout,
        db::organizations::find_member_role(&state.db, &organization_id, user_id),
    )
    .await?
    .ok_or(AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::db::Organization;

    fn membership(id: &OrganizationId, role: OrganizationRole) -> OrganizationMembership {
        OrganizationMembership {
            organization: Organization {
                id: id.as_str(),
                name: format!("org {id}"),
                slug: id.as_str().to_lowercase(),
                plan: "free".to_string(),
                branding: "{}".to_string(),
                white_label: false,
                created_at: 0,
                updated_at: 0,
            },
            role,
        }
    }

    /// Three organizations, newest first.
    fn three() -> (Vec<OrganizationId>, Vec<OrganizationMembership>) {
        let ids: Vec<OrganizationId> = (0..3).map(|_| OrganizationId::new()).collect();
        let memberships = vec![
            membership(&ids[0], OrganizationRole::Member),
            membership(&ids[1], OrganizationRole::Owner),
            membership(&ids[2], OrganizationRole::Admin),
        ];
        (ids, memberships)
    }

    #[test]
    fn no_preference_selects_most_recent() {
        let (ids, memberships) = three();
        let current = select_current(None, &memberships, None).unwrap();
        assert_eq!(current.organization.id, ids[0].as_str());
    }

    #[test]
    fn matching_preference_wins_regardless_of_order() {
        let (ids, memberships) = three();
        let preferred = ids[2].as_str();
        let current = select_current(Some(&preferred), &memberships, Some(&ids[1])).unwrap();
        assert_eq!(current.organization.id, preferred);
        assert_eq!(current.role, OrganizationRole::Admin);
    }

    #[test]
    fn stale_preference_uses_fallback_when_member() {
        let (ids, memberships) = three();
        let stale = OrganizationId::new().as_str();
        let current = select_current(Some(&stale), &memberships, Some(&ids[1])).unwrap();
        assert_eq!(current.organization.id, ids[1].as_str());
    }

    #[test]
    fn stale_preference_without_usable_fallback_uses_most_recent() {
        let (ids, memberships) = three();
        let stale = OrganizationId::new().as_str();
        let outsider = OrganizationId::new();

        let current = select_current(Some(&stale), &memberships, Some(&outsider)).unwrap();
        assert_eq!(current.organization.id, ids[0].as_str());

        let current = select_current(Some(&stale), &memberships, None).unwrap();
        assert_eq!(current.organization.id, ids[0].as_str());
    }

    #[test]
    fn fallback_is_ignored_without_a_preference() {
        let (ids, memberships) = three();
        let current = select_current(None, &memberships, Some(&ids[2])).unwrap();
        assert_eq!(current.organization.id, ids[0].as_str());
    }

    #[test]
    fn no_memberships_selects_nothing() {
        let fallback = OrganizationId::new();
        assert!(select_current(None, &[], None).is_none());
        assert!(select_current(Some("anything"), &[], Some(&fallback)).is_none());
    }

    #[test]
    fn context_checks_permissions_against_current_role() {
        let (ids, memberships) = three();
        let context = TenantContext {
            user_id: UserId::new(),
            organization_id: ids[0].clone(),
            current: memberships[0].clone(),
            memberships,
        };
        assert!(context.can(Permission::ViewDashboard));
        assert!(matches!(context.require(Permission::CreateStore), Err(AppError::Unauthorized)));
    }
}
