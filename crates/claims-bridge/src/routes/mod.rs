//! HTTP routes.

use crate::handlers;
use crate::hooks::JwtAuthHooks;
use crate::middleware::{require_session, AuthState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub hooks: Arc<JwtAuthHooks>,
}

/// Build the application routes.
///
/// - `/health` - liveness, public
/// - `/metrics` - Prometheus scrape, public
/// - `/api/v1/session` - current principal, session required
/// - `/api/v1/auth/token` - fresh token for the current principal, session required
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        hooks: state.hooks.clone(),
    });

    let public_routes = Router::new().route("/health", get(handlers::health_check));

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/api/v1/session", get(handlers::get_session))
        .route("/api/v1/auth/token", post(handlers::issue_token))
        .route_layer(middleware::from_fn_with_state(auth_state, require_session))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
