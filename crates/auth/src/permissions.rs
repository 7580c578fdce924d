use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "parts.read"). The wildcard `"*"`
/// grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission(Cow::Borrowed("*"));
    pub const PARTS_READ: Permission = Permission(Cow::Borrowed("parts.read"));
    pub const REQUISITIONS_READ: Permission = Permission(Cow::Borrowed("requisitions.read"));
    pub const REQUISITIONS_CREATE: Permission = Permission(Cow::Borrowed("requisitions.create"));
    pub const REQUISITIONS_PROCESS: Permission = Permission(Cow::Borrowed("requisitions.process"));
    pub const USERS_READ: Permission = Permission(Cow::Borrowed("users.read"));
    pub const USERS_MANAGE: Permission = Permission(Cow::Borrowed("users.manage"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }

    /// Whether holding `self` satisfies a requirement for `required`.
    pub fn grants(&self, required: &Permission) -> bool {
        self.is_wildcard() || self == required
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_grants_everything() {
        assert!(Permission::WILDCARD.grants(&Permission::USERS_READ));
        assert!(Permission::new("parts.read").grants(&Permission::PARTS_READ));
        assert!(!Permission::PARTS_READ.grants(&Permission::REQUISITIONS_READ));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Permission::REQUISITIONS_PROCESS).unwrap();
        assert_eq!(json, "\"requisitions.process\"");
    }
}
