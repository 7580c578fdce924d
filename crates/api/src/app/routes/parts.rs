use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use sparekeep_auth::Permission;
use sparekeep_core::PartId;
use sparekeep_infra::{FetchState, StoreError};
use sparekeep_inventory::{CatalogFilter, Part};

use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_parts))
        .route("/:id", get(get_part))
}

/// Current catalog snapshot. A failed fetch is reported, never replaced by an
/// empty catalog.
pub(crate) async fn catalog_snapshot(services: &AppServices) -> Result<Vec<Part>, Response> {
    match FetchState::from_result(services.store().fetch_parts().await) {
        FetchState::Ready(parts) => Ok(parts),
        FetchState::Failed(msg) => Err(errors::store_error_to_response(StoreError::Unavailable(msg))),
        FetchState::Loading => Err(errors::store_error_to_response(StoreError::Unavailable(
            "catalog fetch pending".to_string(),
        ))),
    }
}

/// GET /parts?search=&category=&status=
pub async fn list_parts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(filter): Query<CatalogFilter>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::PARTS_READ) {
        return resp;
    }

    match catalog_snapshot(&services).await {
        Ok(parts) => Json(filter.apply(parts.iter())).into_response(),
        Err(resp) => resp,
    }
}

/// GET /parts/:id with derived status, availability and movement history.
pub async fn get_part(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::PARTS_READ) {
        return resp;
    }
    let id: PartId = match errors::parse_id(&id, "part id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let part = match services.store().fetch_part(id).await {
        Ok(Some(part)) => part,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "part not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    let movements = match services.store().fetch_movements(id).await {
        Ok(m) => m,
        Err(e) => return errors::store_error_to_response(e),
    };

    Json(dto::PartDetailsResponse {
        stock: part.status().badge(),
        available: part.is_available(),
        movements,
        part,
    })
    .into_response()
}
