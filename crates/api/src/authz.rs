//! Permission checks at the handler boundary, before any store call or
//! dispatch.

use axum::http::StatusCode;
use axum::response::Response;

use sparekeep_auth::{AuthzError, Permission, UserProfile, authorize};

use crate::app::errors::json_error;
use crate::context::SessionContext;

/// The signed-in user, if they hold `permission`.
pub fn require<'a>(ctx: &'a SessionContext, permission: &Permission) -> Result<&'a UserProfile, Response> {
    let user = signed_in(ctx)?;
    authorize(user, permission).map_err(authz_error_to_response)?;
    Ok(user)
}

/// The signed-in user; no permission needed beyond an active account.
pub fn signed_in(ctx: &SessionContext) -> Result<&UserProfile, Response> {
    let user = ctx
        .user()
        .ok_or_else(|| json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "no active session"))?;
    if !user.is_active() {
        return Err(authz_error_to_response(AuthzError::Inactive));
    }
    Ok(user)
}

pub fn authz_error_to_response(err: AuthzError) -> Response {
    match err {
        AuthzError::Inactive => json_error(StatusCode::FORBIDDEN, "inactive_account", err.to_string()),
        AuthzError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
    }
}
