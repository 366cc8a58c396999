use crate::backend_client::BackendClient;
use crate::cancel::RequestToken;
use crate::config::Config;
use crate::errors::{ApiError, AppError};
use crate::pages;
use crate::views::customers::{ListFilters, ListParams, ListSnapshot};
use crate::views::dashboard::{load_dashboard, DashboardState};
use crate::views::profile::{ProfileState, ProfileTab};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the customer REST backend.
    pub client: BackendClient,
}

/// Status of a page whose backend call failed: 404 passes through, anything
/// else is a bad gateway.
fn page_status(err: &ApiError) -> StatusCode {
    match err.status() {
        Some(404) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// GET /
pub async fn root() -> Redirect {
    Redirect::temporary("/dashboard")
}

/// GET /health
///
/// Reports this service as up and whether the backend answers its own
/// liveness check.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let backend = state.client.get_health(&RequestToken::new()).await?;

    Ok(Json(json!({
        "status": "healthy",
        "service": "customer360-dashboard",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": backend,
    })))
}

/// GET /dashboard
///
/// KPI cards and sync health, fetched concurrently.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("GET /dashboard");

    let token = RequestToken::new();
    let result = load_dashboard(&state.client, &token).await;
    let status = match &result {
        Err(e) => page_status(e),
        Ok(_) => StatusCode::OK,
    };
    let view = DashboardState::from_result(result).unwrap_or(DashboardState::Loading);

    (status, Html(pages::dashboard_page(&view))).into_response()
}

/// GET /customers
///
/// One page of the customer list. The filter form carries no offset, so
/// submitting a changed filter always starts again from the first page.
pub async fn customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Response {
    let filters = ListFilters::from_params(&params, state.config.default_page_size);
    tracing::info!("GET /customers - filters: {:?}", filters);

    let token = RequestToken::new();
    let result = state.client.get_customers(&filters.to_query(), &token).await;
    let status = match &result {
        Err(e) => page_status(e),
        Ok(_) => StatusCode::OK,
    };

    let mut snapshot = ListSnapshot::new(filters);
    snapshot.apply_result(result);

    (
        status,
        Html(pages::customers_page(
            &snapshot,
            state.client.base_url(),
            state.config.search_debounce(),
        )),
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileParams {
    pub tab: Option<String>,
}

/// GET /customers/:customer_id
///
/// The Customer 360 page with the tab selected by `?tab=`.
pub async fn customer_profile(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
    Query(params): Query<ProfileParams>,
) -> Response {
    tracing::info!("GET /customers/{}", customer_id);

    let tab = ProfileTab::parse(params.tab.as_deref());
    let token = RequestToken::new();
    let result = state
        .client
        .get_customer_profile(&customer_id, &token)
        .await;
    let status = match &result {
        Err(e) => page_status(e),
        Ok(_) => StatusCode::OK,
    };
    let view = ProfileState::from_result(result).unwrap_or(ProfileState::Loading);

    (
        status,
        Html(pages::profile_page(
            &customer_id,
            &view,
            tab,
            state.client.base_url(),
        )),
    )
        .into_response()
}

/// Fallback for unmatched paths.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(pages::not_found_page()))
}
