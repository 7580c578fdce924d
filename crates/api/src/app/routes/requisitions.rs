use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use sparekeep_auth::Permission;
use sparekeep_core::{PartId, RequisitionId, UserId};
use sparekeep_inventory::RequisitionHandoff;
use sparekeep_requisitions::{
    MaterialDraft, ProcessRequisition, RequisitionCommand, ServiceBatch, SubmitRequisition,
};

use crate::app::routes::parts::catalog_snapshot;
use crate::app::{dto, errors, services::AppServices};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_requisitions))
        .route("/material", post(submit_material))
        .route("/material/draft", get(material_draft))
        .route("/service", post(submit_service))
        .route("/:id", get(get_requisition))
        .route("/:id/process", post(process_requisition))
}

/// GET /requisitions?category=&status=
pub async fn list_requisitions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<dto::RequisitionsQuery>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::REQUISITIONS_READ) {
        return resp;
    }

    match services.store().list_requisitions(query.category).await {
        Ok(list) => {
            let list: Vec<_> = list
                .into_iter()
                .filter(|r| query.status.is_none_or(|s| r.status == s))
                .collect();
            Json(list).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_requisition(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::REQUISITIONS_READ) {
        return resp;
    }
    let id: RequisitionId = match errors::parse_id(&id, "requisition id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store().load_requisition(id).await {
        Ok(Some(snapshot)) => Json(snapshot).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "requisition not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /requisitions/material/draft?parts=id1,id2
///
/// Resolves an alert-board hand-off into a pre-filled material form.
pub async fn material_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<dto::DraftQuery>,
) -> Response {
    if let Err(resp) = crate::authz::require(&ctx, &Permission::REQUISITIONS_CREATE) {
        return resp;
    }
    let handoff: RequisitionHandoff = match query.parts.parse() {
        Ok(h) => h,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_handoff", format!("{e}")),
    };

    match catalog_snapshot(&services).await {
        Ok(parts) => Json(MaterialDraft::from_handoff(&handoff, &parts)).into_response(),
        Err(resp) => resp,
    }
}

/// POST /requisitions/material
///
/// One requisition per line, submitted together under a single notice.
/// Nothing is submitted unless every line is valid.
pub async fn submit_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::MaterialRequisitionRequest>,
) -> Response {
    let user = match crate::authz::require(&ctx, &Permission::REQUISITIONS_CREATE) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let mut part_ids = Vec::with_capacity(body.lines.len());
    for line in &body.lines {
        match errors::parse_id::<PartId>(&line.part_id, "part id") {
            Ok(id) => part_ids.push(id),
            Err(resp) => return resp,
        }
    }

    let parts = match catalog_snapshot(&services).await {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    let mut draft = MaterialDraft::from_handoff(&RequisitionHandoff { part_ids: part_ids.clone() }, &parts);
    if !draft.unknown.is_empty() {
        let unknown: Vec<String> = draft.unknown.iter().map(ToString::to_string).collect();
        return errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "unknown_parts",
            format!("parts not in catalog: {}", unknown.join(",")),
        );
    }
    if draft.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "select at least one part");
    }
    for (id, line) in part_ids.iter().zip(&body.lines) {
        if let Some(quantity) = line.quantity {
            if let Err(e) = draft.set_quantity(id, quantity) {
                return errors::domain_error_to_response(e);
            }
        }
    }

    let mut commands = draft.into_commands(body.priority, &body.justification, user.id, Utc::now());
    for cmd in &mut commands {
        cmd.work_order = body.work_order.clone();
    }

    submit(&services, commands, user.id).await
}

/// POST /requisitions/service
pub async fn submit_service(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::ServiceRequisitionRequest>,
) -> Response {
    let user = match crate::authz::require(&ctx, &Permission::REQUISITIONS_CREATE) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let mut batch = ServiceBatch::new(body.work_order, body.priority, body.justification);
    for item in body.items {
        if let Err(e) = batch.add_item(item.into()) {
            return errors::domain_error_to_response(e);
        }
    }

    let commands = match batch.submit(user.id, Utc::now()) {
        Ok(commands) => commands,
        Err(e) => return errors::domain_error_to_response(e),
    };

    submit(&services, commands, user.id).await
}

async fn submit(
    services: &AppServices,
    commands: Vec<SubmitRequisition>,
    actor: UserId,
) -> Response {
    match services.submit_requisitions(commands, actor).await {
        Ok(batch) => (StatusCode::CREATED, Json(batch)).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

/// POST /requisitions/:id/process
pub async fn process_requisition(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ProcessRequisitionRequest>,
) -> Response {
    let user = match crate::authz::require(&ctx, &Permission::REQUISITIONS_PROCESS) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let id: RequisitionId = match errors::parse_id(&id, "requisition id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let cmd = RequisitionCommand::Process(ProcessRequisition {
        requisition_id: id,
        status: body.status,
        erp_request_number: body.erp_request_number,
        processed_by: user.id,
        occurred_at: Utc::now(),
    });

    match services.dispatcher().dispatch(id, cmd, user.id).await {
        Ok(dispatched) => Json(dispatched.snapshot).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
