use serde::{Deserialize, Serialize};

use sparekeep_core::DomainError;

use crate::Permission;

/// Role assigned to a user profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Manager,
    Editor,
    Technician,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Administrator,
        Role::Manager,
        Role::Editor,
        Role::Technician,
        Role::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Manager => "manager",
            Role::Editor => "editor",
            Role::Technician => "technician",
            Role::Viewer => "viewer",
        }
    }

    /// Permissions granted by the role.
    pub fn permissions(&self) -> Vec<Permission> {
        match self {
            Role::Administrator => vec![Permission::WILDCARD],
            Role::Manager => vec![
                Permission::PARTS_READ,
                Permission::REQUISITIONS_READ,
                Permission::REQUISITIONS_CREATE,
                Permission::REQUISITIONS_PROCESS,
                Permission::USERS_READ,
            ],
            Role::Editor | Role::Technician => vec![
                Permission::PARTS_READ,
                Permission::REQUISITIONS_READ,
                Permission::REQUISITIONS_CREATE,
            ],
            Role::Viewer => vec![Permission::PARTS_READ, Permission::REQUISITIONS_READ],
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| DomainError::unknown_label("role", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_administrator_holds_wildcard() {
        for role in Role::ALL {
            let wildcard = role.permissions().iter().any(Permission::is_wildcard);
            assert_eq!(wildcard, role == Role::Administrator, "{role}");
        }
    }

    #[test]
    fn viewer_cannot_create_requisitions() {
        assert!(!Role::Viewer.permissions().contains(&Permission::REQUISITIONS_CREATE));
        assert!(Role::Technician.permissions().contains(&Permission::REQUISITIONS_CREATE));
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Manager ".parse::<Role>().unwrap(), Role::Manager);
        assert!("owner".parse::<Role>().is_err());
    }
}
