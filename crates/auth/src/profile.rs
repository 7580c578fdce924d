//! User profiles and the fallbacks used while the stored profile is unknown.

use serde::{Deserialize, Serialize};

use sparekeep_core::UserId;

use crate::Role;

const FALLBACK_NAME: &str = "User";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    /// Value written to the profile `status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }
}

/// Resolved profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub department: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Profile shown right after sign-in, before the stored profile arrives:
    /// the email local part as name, technician role.
    pub fn optimistic(id: UserId, email: Option<&str>) -> Self {
        let email = email.unwrap_or_default();
        let name = email
            .split('@')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_NAME);

        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Technician,
            status: AccountStatus::Active,
            department: None,
            avatar_url: None,
        }
    }

    /// Profile used when the stored profile could not be fetched.
    pub fn fetch_fallback(id: UserId, email: Option<&str>) -> Self {
        Self {
            name: FALLBACK_NAME.to_string(),
            ..Self::optimistic(id, email)
        }
    }

    /// Resolve the outcome of a profile lookup. Lookup errors and missing rows
    /// fall back to [`UserProfile::fetch_fallback`].
    pub fn from_lookup<E: core::fmt::Display>(
        id: UserId,
        session_email: Option<&str>,
        lookup: Result<Option<StoredProfile>, E>,
    ) -> Self {
        match lookup {
            Ok(Some(stored)) => stored.into_profile(session_email),
            Ok(None) => {
                tracing::warn!(user_id = %id, "no stored profile; using fallback");
                Self::fetch_fallback(id, session_email)
            }
            Err(e) => {
                tracing::warn!(user_id = %id, error = %e, "profile lookup failed; using fallback");
                Self::fetch_fallback(id, session_email)
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Profile row as stored by the hosted backend. Every column may be null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub department: Option<String>,
    pub avatar_url: Option<String>,
}

impl StoredProfile {
    /// Apply column fallbacks: name from full name, then username, then
    /// "User"; missing or unknown role is viewer; missing status is active.
    pub fn into_profile(self, session_email: Option<&str>) -> UserProfile {
        let name = non_blank(self.full_name)
            .or_else(|| non_blank(self.username.clone()))
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        let email = non_blank(self.email)
            .or_else(|| session_email.map(str::to_string))
            .or(self.username)
            .unwrap_or_default();

        let role = match non_blank(self.role) {
            None => Role::Viewer,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(user_id = %self.id, role = %raw, "unknown stored role; treating as viewer");
                Role::Viewer
            }),
        };

        let status = match self.status.as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("inactive") => AccountStatus::Inactive,
            _ => AccountStatus::Active,
        };

        UserProfile {
            id: self.id,
            name,
            email,
            role,
            status,
            department: non_blank(self.department),
            avatar_url: non_blank(self.avatar_url),
        }
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimistic_profile_uses_email_local_part() {
        let p = UserProfile::optimistic(UserId::new(), Some("j.silva@plant.example"));
        assert_eq!(p.name, "j.silva");
        assert_eq!(p.role, Role::Technician);
        assert!(p.is_active());

        let anon = UserProfile::optimistic(UserId::new(), None);
        assert_eq!(anon.name, "User");
        assert_eq!(anon.email, "");
    }

    #[test]
    fn stored_profile_defaults_to_viewer_and_generic_name() {
        let id = UserId::new();
        let p = StoredProfile {
            id,
            ..Default::default()
        }
        .into_profile(Some("a@b.c"));

        assert_eq!(p.id, id);
        assert_eq!(p.name, "User");
        assert_eq!(p.email, "a@b.c");
        assert_eq!(p.role, Role::Viewer);
        assert_eq!(p.status, AccountStatus::Active);
    }

    #[test]
    fn stored_profile_prefers_full_name_and_parses_role() {
        let p = StoredProfile {
            id: UserId::new(),
            full_name: Some("Joana Silva".to_string()),
            username: Some("jsilva".to_string()),
            role: Some("Manager".to_string()),
            status: Some("inactive".to_string()),
            ..Default::default()
        }
        .into_profile(None);

        assert_eq!(p.name, "Joana Silva");
        assert_eq!(p.email, "jsilva");
        assert_eq!(p.role, Role::Manager);
        assert!(!p.is_active());
    }

    #[test]
    fn stored_status_round_trips_through_column_value() {
        for status in [AccountStatus::Active, AccountStatus::Inactive] {
            let p = StoredProfile {
                id: UserId::new(),
                status: Some(status.as_str().to_string()),
                ..Default::default()
            }
            .into_profile(None);
            assert_eq!(p.status, status);
        }
    }

    #[test]
    fn unknown_role_is_viewer() {
        let p = StoredProfile {
            id: UserId::new(),
            role: Some("superuser".to_string()),
            ..Default::default()
        }
        .into_profile(None);
        assert_eq!(p.role, Role::Viewer);
    }

    #[test]
    fn failed_lookup_falls_back_to_technician() {
        let id = UserId::new();
        let p = UserProfile::from_lookup(id, Some("x@y.z"), Err::<Option<StoredProfile>, _>("timeout"));
        assert_eq!(p.name, "User");
        assert_eq!(p.role, Role::Technician);
        assert_eq!(p.email, "x@y.z");

        let missing = UserProfile::from_lookup::<&str>(id, None, Ok(None));
        assert_eq!(missing.role, Role::Technician);
    }
}
