use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use sparekeep_core::NotificationId;

use crate::app::{errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:id/read", post(mark_read))
}

/// GET /notifications (the caller's own, newest first)
pub async fn list_notifications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    let user = match crate::authz::signed_in(&ctx) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match services.store().list_notifications(user.id).await {
        Ok(list) => Json(list).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /notifications/:id/read
pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Response {
    let user = match crate::authz::signed_in(&ctx) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let id: NotificationId = match errors::parse_id(&id, "notification id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store().mark_notification_read(user.id, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
