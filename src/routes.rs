use crate::dto::Message;
use crate::routing_utils::Json;
use crate::{SharedData, api, logging};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

/// Builds the complete application: every API route under "/api", the health check and the
/// swagger UI, all wrapped in request tracing
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let api_routes = Router::new()
        .merge(api::auth::auth_routes())
        .merge(api::user::user_routes())
        .merge(api::task::task_routes())
        .merge(api::project::project_routes())
        .merge(api::activity::activity_routes());

    let router = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(|| async { Json(Message::new("ok")) }))
        .merge(api::swagger_main::build_documentation())
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}
