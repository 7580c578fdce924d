//! Session state driven by auth events.

use crate::profile::UserProfile;

/// Auth event delivered by the hosted auth service (or replayed from a token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// First event after start-up, carrying the restored session if any.
    InitialSession(Option<UserProfile>),
    SignedIn(UserProfile),
    /// Stored profile arrived for the signed-in user.
    ProfileLoaded(UserProfile),
    SignedOut,
}

/// `SignedOut -> SignedIn(profile) -> SignedOut`, plus a loading flag that is
/// set until the first session event arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: Option<UserProfile>,
    loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    /// Settled session for an already-resolved profile.
    pub fn signed_in(profile: UserProfile) -> Self {
        Self {
            user: Some(profile),
            loading: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::InitialSession(Some(profile)) | SessionEvent::SignedIn(profile) => {
                // A different user replaces the profile; the same user keeps
                // whatever was already loaded.
                if self.user.as_ref().is_none_or(|u| u.id != profile.id) {
                    self.user = Some(profile);
                }
            }
            SessionEvent::InitialSession(None) | SessionEvent::SignedOut => {
                self.user = None;
            }
            SessionEvent::ProfileLoaded(profile) => {
                match self.user.as_ref() {
                    Some(u) if u.id == profile.id => self.user = Some(profile),
                    _ => tracing::debug!(user_id = %profile.id, "dropping profile for inactive session"),
                }
            }
        }
        self.loading = false;
    }
}
