use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;

use sparekeep_auth::Permission;

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_scopes).post(create_scope))
}

/// GET /service-scopes
pub async fn list_scopes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::REQUISITIONS_READ) {
        return resp;
    }

    match services.store().list_service_scopes().await {
        Ok(scopes) => Json(scopes).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /service-scopes
///
/// Builds the scope step by step the way the form does, then finalizes it.
pub async fn create_scope(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::ServiceScopeRequest>,
) -> Response {
    let user = match crate::authz::require(&ctx, &Permission::REQUISITIONS_CREATE) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let (mut draft, steps) = body.into_draft();
    for step in &steps {
        if let Err(e) = draft.add_step(step) {
            return errors::domain_error_to_response(e);
        }
    }
    let scope = match draft.finalize(user.id, Utc::now()) {
        Ok(scope) => scope,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().insert_service_scope(scope.clone()).await {
        Ok(()) => {
            tracing::info!(scope_id = %scope.id, steps = scope.steps.len(), "service scope finalized");
            (StatusCode::CREATED, Json(scope)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
