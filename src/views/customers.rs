//! Customer list view: filters, pagination and debounced search.
//!
//! [`ListFilters::apply`] is the reducer shared by the page handler and the
//! long-lived [`CustomerListController`]. Every change to a filter, the sort
//! or the page size resets the offset to zero before the next fetch.
//!
//! The controller is the embeddable interactive form of the list; the
//! server-rendered `/customers` page only uses the reducer and snapshot.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::backend_client::{Backend, CustomerQuery};
use crate::cancel::{CancelOnDrop, RequestToken};
use crate::config::PAGE_SIZES;
use crate::errors::ApiError;
use crate::models::{Customer, CustomerListResponse};

pub const STATUS_OPTIONS: [&str; 2] = ["Active", "Inactive"];
pub const GENDER_OPTIONS: [&str; 2] = ["L", "P"];
pub const SEGMENT_OPTIONS: [&str; 4] = ["Bronze", "Silver", "Gold", "Premium"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    LastUpdated,
    RegistrationDate,
    FullName,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::LastUpdated, SortBy::RegistrationDate, SortBy::FullName];

    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::LastUpdated => "last_updated",
            SortBy::RegistrationDate => "registration_date",
            SortBy::FullName => "full_name",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortBy::LastUpdated => "Sort by Last Updated",
            SortBy::RegistrationDate => "Sort by Registration Date",
            SortBy::FullName => "Sort by Full Name",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// User input that can change what the list shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// Raw search text; committed only after the debounce window.
    SearchInput(String),
    SetStatus(String),
    SetGender(String),
    SetSegment(String),
    SetSortBy(SortBy),
    SetOrder(SortOrder),
    SetPageSize(u32),
    NextPage,
    PrevPage,
    Reload,
}

/// Everything that determines which page of customers is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilters {
    pub limit: u32,
    pub offset: u64,
    /// Committed (debounced) search text.
    pub q: String,
    pub status: String,
    pub gender: String,
    pub segment: String,
    pub sort_by: SortBy,
    pub order: SortOrder,
}

impl Default for ListFilters {
    fn default() -> Self {
        Self::with_page_size(20)
    }
}

impl ListFilters {
    pub fn with_page_size(limit: u32) -> Self {
        Self {
            limit,
            offset: 0,
            q: String::new(),
            status: String::new(),
            gender: String::new(),
            segment: String::new(),
            sort_by: SortBy::default(),
            order: SortOrder::default(),
        }
    }

    /// Applies an event and reports whether a new fetch is needed.
    ///
    /// `SearchInput` is treated as already debounced here. Setting a value
    /// equal to the current one changes nothing.
    pub fn apply(&mut self, event: ListEvent) -> bool {
        fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
            if *slot == value {
                return false;
            }
            *slot = value;
            true
        }

        let filter_changed = match event {
            ListEvent::SearchInput(q) => set(&mut self.q, q),
            ListEvent::SetStatus(s) => set(&mut self.status, s),
            ListEvent::SetGender(g) => set(&mut self.gender, g),
            ListEvent::SetSegment(s) => set(&mut self.segment, s),
            ListEvent::SetSortBy(s) => set(&mut self.sort_by, s),
            ListEvent::SetOrder(o) => set(&mut self.order, o),
            ListEvent::SetPageSize(n) => set(&mut self.limit, n.max(1)),
            ListEvent::NextPage => {
                self.offset = self.next_offset();
                return true;
            }
            ListEvent::PrevPage => {
                if self.offset == 0 {
                    return false;
                }
                self.offset = self.prev_offset();
                return true;
            }
            ListEvent::Reload => return true,
        };

        if filter_changed {
            self.offset = 0;
        }
        filter_changed
    }

    pub fn can_prev(&self) -> bool {
        self.offset > 0
    }

    pub fn next_offset(&self) -> u64 {
        self.offset.saturating_add(u64::from(self.limit))
    }

    pub fn prev_offset(&self) -> u64 {
        self.offset.saturating_sub(u64::from(self.limit))
    }

    pub fn to_query(&self) -> CustomerQuery {
        CustomerQuery {
            limit: self.limit,
            offset: self.offset,
            q: self.q.clone(),
            status: self.status.clone(),
            gender: self.gender.clone(),
            segment: self.segment.clone(),
            sort_by: self.sort_by.as_str().to_string(),
            order: self.order.as_str().to_string(),
        }
    }

    /// Builds filters from page query parameters, ignoring values that are
    /// not among the offered options.
    pub fn from_params(params: &ListParams, default_limit: u32) -> Self {
        let pick = |value: &Option<String>, options: &[&str]| {
            value
                .as_deref()
                .filter(|v| options.contains(v))
                .unwrap_or_default()
                .to_string()
        };

        Self {
            limit: params
                .limit
                .as_deref()
                .and_then(|s| s.parse().ok())
                .filter(|n| PAGE_SIZES.contains(n))
                .unwrap_or(default_limit),
            offset: params
                .offset
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            q: params.q.clone().unwrap_or_default(),
            status: pick(&params.status, &STATUS_OPTIONS),
            gender: pick(&params.gender, &GENDER_OPTIONS),
            segment: pick(&params.segment, &SEGMENT_OPTIONS),
            sort_by: params
                .sort_by
                .as_deref()
                .and_then(SortBy::parse)
                .unwrap_or_default(),
            order: params
                .order
                .as_deref()
                .and_then(SortOrder::parse)
                .unwrap_or_default(),
        }
    }
}

/// Raw query parameters of the `/customers` page.
///
/// Kept as strings so a malformed value falls back to its default instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub gender: Option<String>,
    pub segment: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Pagination info of the page currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub limit: u64,
    pub offset: u64,
    pub total: Option<u64>,
}

impl PageMeta {
    /// Prefers the response's values, falling back to the request's.
    pub fn from_response(resp: &CustomerListResponse, filters: &ListFilters) -> Self {
        Self {
            limit: resp.limit.unwrap_or(u64::from(filters.limit)),
            offset: resp.offset.unwrap_or(filters.offset),
            total: resp.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListPhase {
    Loading,
    Loaded,
    Error(String),
}

/// What the list view displays at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub filters: ListFilters,
    /// Search text as typed, possibly not yet committed.
    pub search_input: String,
    pub phase: ListPhase,
    pub rows: Vec<Customer>,
    pub meta: PageMeta,
}

impl ListSnapshot {
    pub fn new(filters: ListFilters) -> Self {
        Self {
            search_input: filters.q.clone(),
            meta: PageMeta {
                limit: u64::from(filters.limit),
                offset: filters.offset,
                total: None,
            },
            filters,
            phase: ListPhase::Loading,
            rows: Vec::new(),
        }
    }

    /// Applies a finished fetch. Cancellation leaves the snapshot untouched.
    pub fn apply_result(&mut self, result: Result<CustomerListResponse, ApiError>) {
        match result {
            Ok(resp) => {
                self.meta = PageMeta::from_response(&resp, &self.filters);
                self.rows = resp.customers;
                self.phase = ListPhase::Loaded;
            }
            Err(ApiError::Cancelled) => {}
            Err(e) => {
                self.rows.clear();
                self.phase = ListPhase::Error(e.to_string());
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ListPhase::Loading
    }

    pub fn showing_text(&self) -> String {
        showing_text(self.meta.offset, self.rows.len(), self.meta.total)
    }
}

/// The "Showing a–b of n" range for a page of `rows` rows at `offset`.
pub fn showing_text(offset: u64, rows: usize, total: Option<u64>) -> String {
    if rows == 0 {
        return "No rows".to_string();
    }
    let start = offset.saturating_add(1);
    let end = offset.saturating_add(rows as u64);
    match total {
        Some(total) => format!("Showing {}–{} of {}", start, end, total),
        None => format!("Showing {}–{}", start, end),
    }
}

struct FetchDone {
    generation: u64,
    result: Result<CustomerListResponse, ApiError>,
}

/// Handle to a running list controller.
///
/// Dropping the handle stops the controller and abandons any in-flight fetch.
pub struct ListHandle {
    events: mpsc::Sender<ListEvent>,
    state: watch::Receiver<ListSnapshot>,
}

impl ListHandle {
    /// Sends a user event to the controller.
    pub async fn send(&self, event: ListEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver for snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.state.clone()
    }
}

/// Drives the list view: debounces search input, issues fetches and
/// publishes snapshots.
pub struct CustomerListController<B: Backend> {
    backend: Arc<B>,
    debounce: Duration,
    filters: ListFilters,
}

impl<B: Backend> CustomerListController<B> {
    pub fn new(backend: Arc<B>, filters: ListFilters, debounce: Duration) -> Self {
        Self {
            backend,
            debounce,
            filters,
        }
    }

    /// Spawns the controller task and issues the initial fetch.
    pub fn spawn(self) -> ListHandle {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(ListSnapshot::new(self.filters.clone()));
        tokio::spawn(self.run(event_rx, state_tx));
        ListHandle {
            events: event_tx,
            state: state_rx,
        }
    }

    async fn run(
        self,
        mut events: mpsc::Receiver<ListEvent>,
        state: watch::Sender<ListSnapshot>,
    ) {
        let (done_tx, mut done_rx) = mpsc::channel::<FetchDone>(8);
        let mut filters = self.filters.clone();
        let mut generation: u64 = 0;
        let mut in_flight: Option<CancelOnDrop> = None;
        let mut pending_search: Option<String> = None;
        let mut deadline: Option<Instant> = None;

        let issue = |filters: &ListFilters,
                     generation: &mut u64,
                     in_flight: &mut Option<CancelOnDrop>| {
            *generation += 1;
            let token = RequestToken::new();
            // Replacing the guard cancels the previous request.
            *in_flight = Some(CancelOnDrop::new(token.clone()));

            state.send_modify(|snap| {
                snap.filters = filters.clone();
                snap.phase = ListPhase::Loading;
            });

            let backend = Arc::clone(&self.backend);
            let query = filters.to_query();
            let done_tx = done_tx.clone();
            let generation = *generation;
            tracing::debug!("Fetching customers (generation {}): {:?}", generation, query);
            tokio::spawn(async move {
                let result = backend.list_customers(&query, &token).await;
                let _ = done_tx.send(FetchDone { generation, result }).await;
            });
        };

        issue(&filters, &mut generation, &mut in_flight);

        loop {
            let debounce_at = deadline.unwrap_or_else(Instant::now);
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        ListEvent::SearchInput(text) => {
                            state.send_modify(|snap| snap.search_input = text.clone());
                            pending_search = Some(text);
                            deadline = Some(Instant::now() + self.debounce);
                        }
                        other => {
                            if filters.apply(other) {
                                issue(&filters, &mut generation, &mut in_flight);
                            }
                        }
                    }
                }
                _ = tokio::time::sleep_until(debounce_at), if deadline.is_some() => {
                    deadline = None;
                    if let Some(text) = pending_search.take() {
                        if filters.apply(ListEvent::SearchInput(text)) {
                            issue(&filters, &mut generation, &mut in_flight);
                        }
                    }
                }
                Some(done) = done_rx.recv() => {
                    if done.generation != generation {
                        tracing::debug!(
                            "Discarding stale customer list response (generation {}, current {})",
                            done.generation,
                            generation
                        );
                        continue;
                    }
                    if let Err(e) = &done.result {
                        if !e.is_cancelled() {
                            tracing::warn!("Customer list fetch failed: {}", e);
                        }
                    }
                    state.send_modify(|snap| snap.apply_result(done.result));
                }
            }
        }

        drop(in_flight);
        tracing::debug!("Customer list controller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Payload;
    use crate::models::{CustomerProfile, KpiSnapshot, SyncHealth};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every query and answers after `delay` with one row per call.
    struct StubBackend {
        delay: Duration,
        queries: Mutex<Vec<CustomerQuery>>,
        fail_with: Option<ApiError>,
        cancelled: AtomicUsize,
    }

    impl StubBackend {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                queries: Mutex::new(Vec::new()),
                fail_with: None,
                cancelled: AtomicUsize::new(0),
            }
        }

        fn queries(&self) -> Vec<CustomerQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Backend for StubBackend {
        async fn list_customers(
            &self,
            query: &CustomerQuery,
            token: &RequestToken,
        ) -> Result<CustomerListResponse, ApiError> {
            self.queries.lock().unwrap().push(query.clone());
            tokio::select! {
                _ = token.cancelled() => {
                    self.cancelled.fetch_add(1, Ordering::SeqCst);
                    return Err(ApiError::Cancelled);
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(CustomerListResponse {
                customers: vec![Customer {
                    customer_id: Some(format!("C-{}-{}", query.q, query.offset)),
                    customer_segment: Some(query.segment.clone()),
                    ..Default::default()
                }],
                limit: Some(u64::from(query.limit)),
                offset: Some(query.offset),
                total: Some(42),
            })
        }

        async fn customer_profile(
            &self,
            _customer_id: &str,
            _token: &RequestToken,
        ) -> Result<CustomerProfile, ApiError> {
            unimplemented!()
        }

        async fn kpi(&self, _token: &RequestToken) -> Result<KpiSnapshot, ApiError> {
            unimplemented!()
        }

        async fn sync_health(&self, _token: &RequestToken) -> Result<SyncHealth, ApiError> {
            unimplemented!()
        }
    }

    async fn wait_loaded(handle: &ListHandle) -> ListSnapshot {
        let mut rx = handle.subscribe();
        let snap = rx
            .wait_for(|s| s.phase != ListPhase::Loading)
            .await
            .unwrap()
            .clone();
        snap
    }

    #[test]
    fn test_filter_change_resets_offset() {
        let mut filters = ListFilters::default();
        filters.offset = 60;

        assert!(filters.apply(ListEvent::SetSegment("Gold".into())));
        assert_eq!(filters.offset, 0);

        filters.offset = 40;
        assert!(filters.apply(ListEvent::SetPageSize(50)));
        assert_eq!(filters.offset, 0);

        filters.offset = 40;
        assert!(filters.apply(ListEvent::SetOrder(SortOrder::Asc)));
        assert_eq!(filters.offset, 0);

        filters.offset = 40;
        assert!(filters.apply(ListEvent::SearchInput("budi".into())));
        assert_eq!(filters.offset, 0);
    }

    #[test]
    fn test_unchanged_value_is_noop() {
        let mut filters = ListFilters::default();
        filters.offset = 20;
        assert!(!filters.apply(ListEvent::SetSortBy(SortBy::LastUpdated)));
        assert_eq!(filters.offset, 20);
    }

    #[test]
    fn test_pagination() {
        let mut filters = ListFilters::default();
        assert!(!filters.can_prev());
        assert!(!filters.apply(ListEvent::PrevPage));

        assert!(filters.apply(ListEvent::NextPage));
        assert!(filters.apply(ListEvent::NextPage));
        assert_eq!(filters.offset, 40);

        assert!(filters.apply(ListEvent::PrevPage));
        assert_eq!(filters.offset, 20);

        filters.limit = 50;
        assert!(filters.apply(ListEvent::PrevPage));
        assert_eq!(filters.offset, 0);
    }

    #[test]
    fn test_from_params_ignores_unknown_values() {
        let params = ListParams {
            q: Some("  siti ".into()),
            status: Some("Active".into()),
            gender: Some("X".into()),
            segment: Some("Gold".into()),
            sort_by: Some("drop table".into()),
            order: Some("asc".into()),
            limit: Some("7".into()),
            offset: Some("abc".into()),
        };
        let filters = ListFilters::from_params(&params, 20);

        assert_eq!(filters.q, "  siti ");
        assert_eq!(filters.status, "Active");
        assert_eq!(filters.gender, "");
        assert_eq!(filters.segment, "Gold");
        assert_eq!(filters.sort_by, SortBy::LastUpdated);
        assert_eq!(filters.order, SortOrder::Asc);
        assert_eq!(filters.limit, 20);
        assert_eq!(filters.offset, 0);
    }

    #[test]
    fn test_huge_offset_saturates() {
        let params = ListParams {
            offset: Some(u64::MAX.to_string()),
            ..Default::default()
        };
        let mut filters = ListFilters::from_params(&params, 20);
        assert_eq!(filters.offset, u64::MAX);
        assert_eq!(filters.next_offset(), u64::MAX);

        assert!(filters.apply(ListEvent::NextPage));
        assert_eq!(filters.offset, u64::MAX);

        let max = u64::MAX;
        assert_eq!(
            showing_text(max, 1, None),
            format!("Showing {}–{}", max, max)
        );
    }

    #[test]
    fn test_showing_text() {
        assert_eq!(showing_text(0, 2, Some(2)), "Showing 1–2 of 2");
        assert_eq!(showing_text(40, 20, None), "Showing 41–60");
        assert_eq!(showing_text(0, 0, Some(10)), "No rows");
    }

    #[test]
    fn test_snapshot_meta_falls_back_to_request() {
        let mut filters = ListFilters::default();
        filters.offset = 20;
        let mut snap = ListSnapshot::new(filters);
        snap.apply_result(Ok(CustomerListResponse {
            customers: vec![Customer::default(); 3],
            ..Default::default()
        }));

        assert_eq!(snap.phase, ListPhase::Loaded);
        assert_eq!(snap.meta, PageMeta { limit: 20, offset: 20, total: None });
        assert_eq!(snap.showing_text(), "Showing 21–23");
    }

    #[test]
    fn test_snapshot_error_clears_rows_and_cancel_is_ignored() {
        let mut snap = ListSnapshot::new(ListFilters::default());
        snap.apply_result(Ok(CustomerListResponse {
            customers: vec![Customer::default()],
            ..Default::default()
        }));

        snap.apply_result(Err(ApiError::Cancelled));
        assert_eq!(snap.phase, ListPhase::Loaded);
        assert_eq!(snap.rows.len(), 1);

        snap.apply_result(Err(ApiError::Http {
            status: 500,
            message: "Internal Server Error".into(),
            payload: Payload::Empty,
        }));
        assert_eq!(
            snap.phase,
            ListPhase::Error("HTTP 500 Internal Server Error".into())
        );
        assert!(snap.rows.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_initial_fetch() {
        let backend = Arc::new(StubBackend::new(Duration::from_millis(10)));
        let handle = CustomerListController::new(
            backend.clone(),
            ListFilters::default(),
            Duration::from_millis(350),
        )
        .spawn();

        let snap = wait_loaded(&handle).await;
        assert_eq!(snap.rows.len(), 1);
        assert_eq!(snap.showing_text(), "Showing 1–1 of 42");
        assert_eq!(backend.queries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_debounces_search_input() {
        let backend = Arc::new(StubBackend::new(Duration::from_millis(10)));
        let handle = CustomerListController::new(
            backend.clone(),
            ListFilters::default(),
            Duration::from_millis(350),
        )
        .spawn();
        wait_loaded(&handle).await;

        for text in ["b", "bu", "bud", "budi"] {
            handle.send(ListEvent::SearchInput(text.into())).await;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(backend.queries().len(), 1, "no fetch while still typing");

        tokio::time::sleep(Duration::from_millis(400)).await;
        let snap = wait_loaded(&handle).await;

        let queries = backend.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].q, "budi");
        assert_eq!(snap.filters.q, "budi");
        assert_eq!(snap.search_input, "budi");
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_resets_offset_before_fetch() {
        let backend = Arc::new(StubBackend::new(Duration::from_millis(10)));
        let handle = CustomerListController::new(
            backend.clone(),
            ListFilters::default(),
            Duration::from_millis(350),
        )
        .spawn();
        wait_loaded(&handle).await;

        handle.send(ListEvent::NextPage).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.send(ListEvent::SetStatus("Active".into())).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let queries = backend.queries();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[1].offset, 20);
        assert_eq!(queries[2].offset, 0);
        assert_eq!(queries[2].status, "Active");
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_discards_superseded_response() {
        let backend = Arc::new(StubBackend::new(Duration::from_millis(200)));
        let handle = CustomerListController::new(
            backend.clone(),
            ListFilters::default(),
            Duration::from_millis(350),
        )
        .spawn();

        // Supersede the initial request before it can answer.
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.send(ListEvent::SetSegment("Gold".into())).await;

        let snap = wait_loaded(&handle).await;
        assert_eq!(snap.filters.segment, "Gold");
        assert_eq!(snap.rows[0].customer_segment.as_deref(), Some("Gold"));
        assert_eq!(backend.queries().len(), 2);
        assert_eq!(backend.queries()[1].segment, "Gold");
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_surfaces_errors() {
        let mut stub = StubBackend::new(Duration::from_millis(10));
        stub.fail_with = Some(ApiError::Transport("connection refused".into()));
        let handle = CustomerListController::new(
            Arc::new(stub),
            ListFilters::default(),
            Duration::from_millis(350),
        )
        .spawn();

        let snap = wait_loaded(&handle).await;
        assert_eq!(snap.phase, ListPhase::Error("connection refused".into()));
        assert!(snap.rows.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_in_flight_fetch() {
        let backend = Arc::new(StubBackend::new(Duration::from_secs(5)));
        let handle = CustomerListController::new(
            backend.clone(),
            ListFilters::default(),
            Duration::from_millis(350),
        )
        .spawn();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.queries().len(), 1);
        assert_eq!(backend.cancelled.load(Ordering::SeqCst), 0);

        drop(handle);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(backend.cancelled.load(Ordering::SeqCst), 1);
    }
}
