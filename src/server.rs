//! Router assembly for the dashboard.

use crate::backend_client::BackendClient;
use crate::config::Config;
use crate::handlers::{self, AppState};
use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Builds the application state from configuration.
pub fn build_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let client = BackendClient::new(config.api_base_url.clone(), config.api_timeout())?;
    tracing::info!("✓ Backend client initialized: {}", client.base_url());
    Ok(Arc::new(AppState { config, client }))
}

/// Builds the dashboard router.
///
/// Page requests get a little longer than one backend call to finish, since
/// the dashboard page waits on two calls in parallel.
pub fn router(state: Arc<AppState>) -> Router {
    let page_timeout = state.config.api_timeout() + Duration::from_secs(5);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/dashboard", get(handlers::dashboard))
        .route("/customers", get(handlers::customers))
        .route("/customers/:customer_id", get(handlers::customer_profile))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(page_timeout)),
        )
        .layer(CorsLayer::permissive())
}
