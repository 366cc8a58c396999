//! Landing page metrics: KPI counts and the sync-health snapshot.

use crate::backend_client::Backend;
use crate::cancel::RequestToken;
use crate::errors::ApiError;
use crate::models::{KpiSnapshot, SyncHealth};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub kpi: KpiSnapshot,
    pub sync: SyncHealth,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    Loaded(Box<DashboardData>),
    Error(String),
}

/// Fetches KPI and sync health concurrently.
///
/// Either failure fails the whole load; nothing is rendered partially and
/// nothing is retried.
pub async fn load_dashboard<B: Backend + ?Sized>(
    backend: &B,
    token: &RequestToken,
) -> Result<DashboardData, ApiError> {
    let (kpi, sync) = tokio::try_join!(backend.kpi(token), backend.sync_health(token))?;
    Ok(DashboardData { kpi, sync })
}

impl DashboardState {
    /// State after a finished load; `None` for a cancelled one.
    pub fn from_result(result: Result<DashboardData, ApiError>) -> Option<Self> {
        match result {
            Ok(data) => Some(DashboardState::Loaded(Box::new(data))),
            Err(ApiError::Cancelled) => None,
            Err(e) => {
                tracing::warn!("Dashboard load failed: {}", e);
                Some(DashboardState::Error(e.to_string()))
            }
        }
    }
}
