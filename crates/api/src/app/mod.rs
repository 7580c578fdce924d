//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (store, requisition bus, dispatcher, notifier)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use sparekeep_auth::Hs256JwtValidator;
use sparekeep_infra::{PartStore, StoreError};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, StoreError> {
    let services = services::build_services(config).await?;
    Ok(router(&config.jwt_secret, &config.jwt_audience, services))
}

/// Router over an explicit store instead of the configured one.
pub async fn build_app_with_store(
    jwt_secret: &str,
    jwt_audience: &str,
    store: Arc<dyn PartStore>,
) -> Router {
    router(jwt_secret, jwt_audience, services::services_with_store(store))
}

fn router(jwt_secret: &str, jwt_audience: &str, services: services::AppServices) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret, jwt_audience));
    let auth_state = middleware::AuthState {
        jwt,
        store: services.store().clone(),
    };

    // Protected routes: require a verified token and a resolved session.
    let protected = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::trace_requests)))
}
