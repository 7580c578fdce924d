use axum::{Router, routing::get};

pub mod alerts;
pub mod dashboard;
pub mod notifications;
pub mod parts;
pub mod requisitions;
pub mod service_scopes;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .route("/dashboard", get(dashboard::summary))
        .nest("/parts", parts::router())
        .nest("/alerts", alerts::router())
        .nest("/requisitions", requisitions::router())
        .nest("/service-scopes", service_scopes::router())
        .nest("/notifications", notifications::router())
        .nest("/users", users::router())
}
