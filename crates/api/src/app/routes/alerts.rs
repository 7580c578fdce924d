use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use sparekeep_auth::Permission;
use sparekeep_core::PartId;
use sparekeep_inventory::{AlertBoard, AlertSelection};
use sparekeep_requisitions::MaterialDraft;

use crate::app::routes::parts::catalog_snapshot;
use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_alerts))
        .route("/requisition", post(requisition_from_selection))
}

/// GET /alerts
pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::PARTS_READ) {
        return resp;
    }

    match catalog_snapshot(&services).await {
        Ok(parts) => Json(dto::AlertsResponse::from(&AlertBoard::from_parts(parts))).into_response(),
        Err(resp) => resp,
    }
}

/// POST /alerts/requisition
///
/// Replays the caller's toggles over the current board and commits the
/// selection. Nothing selected is `204`; otherwise the hand-off and the
/// material draft it resolves to.
pub async fn requisition_from_selection(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::AlertRequisitionRequest>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::REQUISITIONS_CREATE) {
        return resp;
    }

    let mut ids = Vec::with_capacity(body.part_ids.len());
    for raw in &body.part_ids {
        match errors::parse_id::<PartId>(raw, "part id") {
            Ok(id) => ids.push(id),
            Err(resp) => return resp,
        }
    }

    let parts = match catalog_snapshot(&services).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };
    let board = AlertBoard::from_parts(parts.iter().cloned());

    let mut selection = AlertSelection::new();
    for id in ids {
        if !board.contains(&id) {
            return errors::json_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "not_on_alert_board",
                format!("part {id} is not on the alert board"),
            );
        }
        selection.toggle(id);
    }

    let Some(handoff) = selection.commit() else {
        return StatusCode::NO_CONTENT.into_response();
    };

    tracing::info!(parts = handoff.part_ids.len(), "alert selection handed off");
    let draft = MaterialDraft::from_handoff(&handoff, &parts);
    Json(dto::AlertRequisitionResponse {
        handoff: handoff.joined(),
        draft,
    })
    .into_response()
}
