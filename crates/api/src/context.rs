use sparekeep_auth::{Session, UserProfile};
use sparekeep_core::UserId;

/// Session context for a request.
///
/// Built by the auth middleware from the verified token and the stored
/// profile, then passed to handlers through request extensions. There is no
/// process-wide session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session: Session,
}

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.current_user()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user().map(|u| u.id)
    }
}
