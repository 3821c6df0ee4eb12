//! Wires every handler in [`crate::routes`] to its path, the way
//! `integrations::server::build_router` assembles the Linear service's
//! router (§6 route table, §10.2).

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::routes::{callbacks, envvars, health, logs, previews, services, user, webhooks};
use crate::state::AppState;

#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/webhooks/github", post(webhooks::receive))
        .route("/v1/callbacks/build-complete", post(callbacks::receive))
        .route("/v1/projects/{slug}/services", post(services::create))
        .route("/v1/projects/{slug}/services/bulk", post(services::bulk_create))
        .route("/v1/services/{id}/build", post(services::trigger_build))
        .route("/v1/services/{id}/builds/{commit}/status", get(services::build_status))
        .route("/v1/services/{id}/logs/stream", get(logs::stream))
        .route("/v1/services/{id}/logs", get(logs::historical))
        .route("/v1/services/{id}/env-vars", post(envvars::create).get(envvars::list))
        .route("/v1/services/{id}/env-vars/{env_var_id}", get(envvars::get).put(envvars::update))
        .route("/v1/services/{id}/env-vars/{env_var_id}/reveal", post(envvars::reveal))
        .route("/v1/previews", post(previews::create))
        .route("/v1/previews/{id}/wake", post(previews::wake))
        .route("/v1/user/tokens", get(user::list_tokens))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
