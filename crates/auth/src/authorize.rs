use thiserror::Error;

use crate::{Permission, UserProfile};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("account is inactive")]
    Inactive,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a profile for a permission using its role's grants.
///
/// - No IO
/// - No panics
/// - Inactive accounts are denied everything
pub fn authorize(profile: &UserProfile, required: &Permission) -> Result<(), AuthzError> {
    if !profile.is_active() {
        return Err(AuthzError::Inactive);
    }

    if profile.role.permissions().iter().any(|p| p.grants(required)) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountStatus, Role};
    use sparekeep_core::UserId;

    fn test_profile(role: Role) -> UserProfile {
        UserProfile {
            role,
            ..UserProfile::optimistic(UserId::new(), Some("user@plant.example"))
        }
    }

    #[test]
    fn administrator_is_allowed_everything() {
        let admin = test_profile(Role::Administrator);
        assert!(authorize(&admin, &Permission::USERS_READ).is_ok());
        assert!(authorize(&admin, &Permission::new("anything.else")).is_ok());
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let viewer = test_profile(Role::Viewer);
        match authorize(&viewer, &Permission::REQUISITIONS_PROCESS) {
            Err(AuthzError::Forbidden(p)) => assert_eq!(p, "requisitions.process"),
            other => panic!("expected forbidden, got {other:?}"),
        }
        assert!(authorize(&viewer, &Permission::PARTS_READ).is_ok());
    }

    #[test]
    fn only_administrators_manage_users() {
        assert!(authorize(&test_profile(Role::Administrator), &Permission::USERS_MANAGE).is_ok());
        for role in [Role::Manager, Role::Editor, Role::Technician, Role::Viewer] {
            assert!(
                matches!(
                    authorize(&test_profile(role), &Permission::USERS_MANAGE),
                    Err(AuthzError::Forbidden(_))
                ),
                "{role} must not manage users"
            );
        }
    }

    #[test]
    fn inactive_accounts_are_denied() {
        let mut admin = test_profile(Role::Administrator);
        admin.status = AccountStatus::Inactive;
        assert_eq!(authorize(&admin, &Permission::PARTS_READ), Err(AuthzError::Inactive));
    }
}
