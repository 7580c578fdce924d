use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use sparekeep_core::DomainError;
use sparekeep_infra::{DispatchError, StoreError};

pub fn dispatch_error_to_response(err: DispatchError) -> axum::response::Response {
    match err {
        DispatchError::Rejected(e) => domain_error_to_response(e),
        DispatchError::Store(e) => store_error_to_response(e),
        DispatchError::Publish(msg) => json_error(StatusCode::BAD_GATEWAY, "publish_error", msg),
    }
}

/// Field-level rejections carry a `field` key naming the input.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let (status, code) = match &err {
        DomainError::InvalidField { .. } | DomainError::UnknownLabel { .. } | DomainError::InvalidId { .. } => {
            (StatusCode::BAD_REQUEST, "validation_error")
        }
        DomainError::IllegalTransition { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "illegal_transition"),
        DomainError::AlreadyExists(_) | DomainError::StaleVersion { .. } => (StatusCode::CONFLICT, "conflict"),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
    };

    let mut body = json!({
        "error": code,
        "message": err.to_string(),
    });
    if let Some(field) = err.field() {
        body["field"] = json!(field);
    }
    (status, axum::Json(body)).into_response()
}

/// Store failures never leak backend details past the log line.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Unavailable(msg) => {
            tracing::warn!(error = %msg, "store unavailable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "the inventory store is unavailable, try again later",
            )
        }
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Malformed(msg) => {
            tracing::error!(error = %msg, "malformed record in store");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "malformed_record",
                "a stored record could not be read",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path/body id, mapping failures to `400 invalid_id`.
pub fn parse_id<T: core::str::FromStr>(raw: &str, what: &str) -> Result<T, axum::response::Response> {
    raw.trim()
        .parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what}")))
}
