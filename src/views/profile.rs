//! Customer 360 view: one customer's profile with derived counters.
//!
//! [`ProfileView`] is the embeddable interactive controller; the
//! server-rendered profile page only uses the summary, tab and state types.

use std::sync::Arc;
use tokio::sync::watch;

use crate::backend_client::Backend;
use crate::cancel::{CancelOnDrop, RequestToken};
use crate::errors::ApiError;
use crate::format::coerce_number;
use crate::models::{CreditApplication, CustomerProfile, VehicleOwnership};

/// Counters shown on the summary cards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProfileSummary {
    pub total_applications: usize,
    pub approved: usize,
    /// Applications that are "Pending" or "Under Review".
    pub in_review: usize,
    /// Sum of `outstanding_amount`; non-numeric amounts count as zero.
    pub total_outstanding: f64,
    pub vehicles: usize,
}

impl ProfileSummary {
    pub fn from_parts(apps: &[CreditApplication], vehicles: &[VehicleOwnership]) -> Self {
        let status_is = |app: &CreditApplication, wanted: &[&str]| {
            app.application_status
                .as_deref()
                .is_some_and(|s| wanted.contains(&s))
        };

        Self {
            total_applications: apps.len(),
            approved: apps.iter().filter(|a| status_is(a, &["Approved"])).count(),
            in_review: apps
                .iter()
                .filter(|a| status_is(a, &["Pending", "Under Review"]))
                .count(),
            total_outstanding: apps
                .iter()
                .map(|a| coerce_number(a.outstanding_amount.as_ref()))
                .sum(),
            vehicles: vehicles.len(),
        }
    }

    pub fn of(profile: &CustomerProfile) -> Self {
        Self::from_parts(&profile.credit_applications, &profile.vehicle_ownership)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Summary,
    Applications,
    Vehicles,
    Raw,
}

impl ProfileTab {
    pub const ALL: [ProfileTab; 4] = [
        ProfileTab::Summary,
        ProfileTab::Applications,
        ProfileTab::Vehicles,
        ProfileTab::Raw,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ProfileTab::Summary => "summary",
            ProfileTab::Applications => "applications",
            ProfileTab::Vehicles => "vehicles",
            ProfileTab::Raw => "raw",
        }
    }

    /// Parses the `tab` query parameter; unknown values fall back to the summary.
    pub fn parse(key: Option<&str>) -> Self {
        key.and_then(|k| Self::ALL.into_iter().find(|t| t.key() == k))
            .unwrap_or_default()
    }

    /// Tab caption, with record counts where the tab lists records.
    pub fn label(self, profile: &CustomerProfile) -> String {
        match self {
            ProfileTab::Summary => "Summary".to_string(),
            ProfileTab::Applications => {
                format!("Credit Apps ({})", profile.credit_applications.len())
            }
            ProfileTab::Vehicles => format!("Vehicles ({})", profile.vehicle_ownership.len()),
            ProfileTab::Raw => "Raw JSON".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    Loading,
    Loaded(Box<CustomerProfile>),
    Error(String),
    /// The backend answered without a body.
    Empty,
}

impl ProfileState {
    /// State after a finished fetch; `None` for a cancelled one.
    pub fn from_result(result: Result<CustomerProfile, ApiError>) -> Option<Self> {
        match result {
            Ok(profile) if profile.is_empty() => Some(ProfileState::Empty),
            Ok(profile) => Some(ProfileState::Loaded(Box::new(profile))),
            Err(ApiError::Cancelled) => None,
            Err(e) => Some(ProfileState::Error(e.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSnapshot {
    pub customer_id: Option<String>,
    pub generation: u64,
    pub state: ProfileState,
}

/// Keeps one customer's profile loaded, following identifier changes.
///
/// Selecting a new identifier cancels the previous request; a result that
/// arrives for an identifier no longer selected is dropped.
pub struct ProfileView<B: Backend> {
    backend: Arc<B>,
    state: Arc<watch::Sender<ProfileSnapshot>>,
    in_flight: Option<CancelOnDrop>,
}

impl<B: Backend> ProfileView<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (state, _) = watch::channel(ProfileSnapshot {
            customer_id: None,
            generation: 0,
            state: ProfileState::Empty,
        });
        Self {
            backend,
            state: Arc::new(state),
            in_flight: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        self.state.borrow().clone()
    }

    /// Switches the view to `customer_id` and starts loading it.
    pub fn select(&mut self, customer_id: impl Into<String>) {
        let customer_id = customer_id.into();
        let token = RequestToken::new();
        self.in_flight = Some(CancelOnDrop::new(token.clone()));

        let mut generation = 0;
        self.state.send_modify(|snap| {
            snap.generation += 1;
            snap.customer_id = Some(customer_id.clone());
            snap.state = ProfileState::Loading;
            generation = snap.generation;
        });

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let result = backend.customer_profile(&customer_id, &token).await;
            let Some(next) = ProfileState::from_result(result) else {
                return;
            };
            if let ProfileState::Error(msg) = &next {
                tracing::warn!("Profile fetch for {} failed: {}", customer_id, msg);
            }
            state.send_if_modified(|snap| {
                if snap.generation != generation {
                    tracing::debug!("Discarding stale profile response for {}", customer_id);
                    return false;
                }
                snap.state = next;
                true
            });
        });
    }
}
