use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    response::{IntoResponse, Response},
};

use sparekeep_auth::Permission;
use sparekeep_inventory::InventorySummary;

use crate::app::routes::parts::catalog_snapshot;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::PARTS_READ) {
        return resp;
    }

    match catalog_snapshot(&services).await {
        Ok(parts) => Json(InventorySummary::from_parts(&parts)).into_response(),
        Err(resp) => resp,
    }
}
