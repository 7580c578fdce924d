use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::app::{dto, services::{self, AppServices}};
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Session snapshot for the caller, including inactive accounts.
pub async fn whoami(Extension(ctx): Extension<SessionContext>) -> Response {
    match ctx.user() {
        Some(user) => Json(dto::WhoAmIResponse::from(user)).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    let user = match crate::authz::signed_in(&ctx) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    services::user_sse_stream(services, user.id).into_response()
}
