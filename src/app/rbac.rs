//! Role → permission table.
//!
//! Every role lists its permissions explicitly. `Owner` is not a wildcard: a
//! permission added to `Permission` is granted to nobody until it is added here.

use crate::app::domain::{OrganizationRole, Permission};

const OWNER_PERMISSIONS: &[Permission] = &[
    Permission::ManageOrganization,
    Permission::ManageBilling,
    Permission::ManageMembers,
    Permission::CreateStore,
    Permission::DeleteStore,
    Permission::ManageStoreSettings,
    Permission::ViewDashboard,
];

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ManageOrganization,
    Permission::ManageMembers,
    Permission::CreateStore,
    Permission::ManageStoreSettings,
    Permission::ViewDashboard,
];

const MEMBER_PERMISSIONS: &[Permission] = &[Permission::ViewDashboard];

/// Permissions granted to a role.
pub fn permissions_for(role: OrganizationRole) -> &'static [Permission] {
    match role {
        OrganizationRole::Owner => OWNER_PERMISSIONS,
        OrganizationRole::Admin => ADMIN_PERMISSIONS,
        OrganizationRole::Member => MEMBER_PERMISSIONS,
    }
}

pub fn has_permission(role: OrganizationRole, permission: Permission) -> bool {
    permissions_for(role).contains(&permission)
}

/// Same as `has_permission` for a role read from storage or a client.
/// Unrecognized roles fail closed.
pub fn has_role_permission(role: &str, permission: Permission) -> bool {
    match role.parse::<OrganizationRole>() {
        Ok(role) => has_permission(role, permission),
        Err(_) => false,
    }
}

pub fn can_create_store(role: OrganizationRole) -> bool {
    has_permission(role, Permission::CreateStore)
}

pub fn can_manage_billing(role: OrganizationRole) -> bool {
    has_permission(role, Permission::ManageBilling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    const ROLES: [OrganizationRole; 3] = [
        OrganizationRole::Owner,
        OrganizationRole::Admin,
        OrganizationRole::Member,
    ];

    #[test]
    fn owner_is_enumerated_with_every_permission() {
        for permission in Permission::iter() {
            assert!(
                OWNER_PERMISSIONS.contains(&permission),
                "owner list is missing {permission}"
            );
        }
    }

    #[test]
    fn admin_lacks_billing_and_store_deletion() {
        assert!(!has_permission(OrganizationRole::Admin, Permission::ManageBilling));
        assert!(!has_permission(OrganizationRole::Admin, Permission::DeleteStore));
        assert!(has_permission(OrganizationRole::Admin, Permission::ManageMembers));
    }

    #[test]
    fn member_can_only_view_dashboard() {
        for permission in Permission::iter() {
            assert_eq!(
                has_permission(OrganizationRole::Member, permission),
                permission == Permission::ViewDashboard,
                "member / {permission}"
            );
        }
    }

    #[test]
    fn every_role_can_view_dashboard() {
        for role in ROLES {
            assert!(has_permission(role, Permission::ViewDashboard));
        }
    }

    #[test]
    fn helpers_agree_with_table() {
        for role in ROLES {
            assert_eq!(can_create_store(role), has_permission(role, Permission::CreateStore));
            assert_eq!(can_manage_billing(role), has_permission(role, Permission::ManageBilling));
        }
    }

    #[test]
    fn can_create_store_by_role() {
        assert!(!can_create_store(OrganizationRole::Member));
        assert!(can_create_store(OrganizationRole::Owner));
    }

    #[test]
    fn string_roles_match_typed_roles() {
        for role in ROLES {
            for permission in Permission::iter() {
                assert_eq!(
                    has_role_permission(&role.to_string(), permission),
                    has_permission(role, permission)
                );
            }
        }
    }

    #[test]
    fn unknown_role_fails_closed() {
        for role in ["superuser", "", "OWNER", "viewer"] {
            for permission in Permission::iter() {
                assert!(!has_role_permission(role, permission), "{role:?} / {permission}");
            }
        }
    }
}
