use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use sparekeep_auth::{Permission, UserProfile};
use sparekeep_core::UserId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id/status", post(set_user_status))
}

/// GET /users
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::USERS_READ) {
        return resp;
    }

    match services.store().list_profiles().await {
        Ok(rows) => {
            let users: Vec<UserProfile> = rows.into_iter().map(|p| p.into_profile(None)).collect();
            Json(users).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /users/:id/status
///
/// Takes effect on the user's next request.
pub async fn set_user_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UserStatusRequest>,
) -> Response {
    let admin = match crate::authz::require(&ctx, &Permission::USERS_MANAGE) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let id: UserId = match errors::parse_id(&id, "user id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Err(e) = services.store().set_profile_status(id, body.status).await {
        return errors::store_error_to_response(e);
    }
    tracing::info!(user_id = %id, status = body.status.as_str(), by = %admin.id, "account status changed");

    match services.store().fetch_profile(id).await {
        Ok(Some(stored)) => Json(stored.into_profile(None)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
