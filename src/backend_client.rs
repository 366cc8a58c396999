use crate::cancel::RequestToken;
use crate::errors::{ApiError, Payload};
use crate::models::{self, CustomerListResponse, CustomerProfile, KpiSnapshot, SyncHealth};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Builds a query string from `(key, value)` pairs.
///
/// Pairs whose value is `None` or renders to the empty string are omitted.
/// A key that appears more than once keeps its position and takes the last
/// value. Returns `""` when nothing is left, otherwise `"?k=v&..."`.
pub fn to_query<K, V, I>(params: I) -> String
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: AsRef<str>,
    V: ToString,
{
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in params {
        let Some(value) = value.map(|v| v.to_string()) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let key = key.as_ref();
        match pairs.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value,
            None => pairs.push((key.to_string(), value)),
        }
    }

    if pairs.is_empty() {
        return String::new();
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish();
    format!("?{}", encoded)
}

/// Query of `GET /api/v1/customers`. Empty strings mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerQuery {
    pub limit: u32,
    pub offset: u64,
    pub q: String,
    pub status: String,
    pub gender: String,
    pub segment: String,
    pub sort_by: String,
    pub order: String,
}

impl CustomerQuery {
    pub fn pairs(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("limit", Some(self.limit.to_string())),
            ("offset", Some(self.offset.to_string())),
            ("q", Some(self.q.clone())),
            ("status", Some(self.status.clone())),
            ("gender", Some(self.gender.clone())),
            ("segment", Some(self.segment.clone())),
            ("sort_by", Some(self.sort_by.clone())),
            ("order", Some(self.order.clone())),
        ]
    }

    pub fn to_query_string(&self) -> String {
        to_query(self.pairs())
    }
}

/// Backend calls the dashboard views depend on.
///
/// Implemented by [`BackendClient`]; view controllers are generic over it so
/// they can be driven by a stub in tests.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn list_customers(
        &self,
        query: &CustomerQuery,
        token: &RequestToken,
    ) -> Result<CustomerListResponse, ApiError>;

    async fn customer_profile(
        &self,
        customer_id: &str,
        token: &RequestToken,
    ) -> Result<CustomerProfile, ApiError>;

    async fn kpi(&self, token: &RequestToken) -> Result<KpiSnapshot, ApiError>;

    async fn sync_health(&self, token: &RequestToken) -> Result<SyncHealth, ApiError>;
}

/// Client for the read-only customer REST backend.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a new `BackendClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the backend, e.g. `http://localhost:8080`.
    /// * `timeout` - Transport-level timeout for each request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ApiError::InvalidRequest(format!("Failed to create backend client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a GET for `path` and returns the response payload.
    ///
    /// The body is read in full as text. Invalid JSON degrades to
    /// [`Payload::Text`]. A non-2xx status fails with [`ApiError::Http`],
    /// whose message is the payload's `error` field or else the status text.
    /// Cancelling `token` abandons the request with [`ApiError::Cancelled`].
    pub async fn fetch_json(&self, path: &str, token: &RequestToken) -> Result<Payload, ApiError> {
        if token.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("Request to {} cancelled", path);
                Err(ApiError::Cancelled)
            }
            result = self.fetch_uncancelled(path) => result,
        }
    }

    async fn fetch_uncancelled(&self, path: &str) -> Result<Payload, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let url = reqwest::Url::parse(&url)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build URL {}: {}", url, e)))?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("Backend request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read backend response: {}", e)))?;
        let payload = Payload::from_body(text);

        if !status.is_success() {
            let message = payload
                .error_field()
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
            tracing::warn!("Backend returned {} for {}: {}", status.as_u16(), path, message);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
                payload,
            });
        }

        Ok(payload)
    }

    /// `GET /api/v1/health`
    pub async fn get_health(&self, token: &RequestToken) -> Result<serde_json::Value, ApiError> {
        Ok(self.fetch_json("/api/v1/health", token).await?.into_value())
    }

    /// `GET /api/v1/customers` with the list filters.
    pub async fn get_customers(
        &self,
        query: &CustomerQuery,
        token: &RequestToken,
    ) -> Result<CustomerListResponse, ApiError> {
        let path = format!("/api/v1/customers{}", query.to_query_string());
        let payload = self.fetch_json(&path, token).await?;
        Ok(models::from_payload(payload.into_value()))
    }

    /// `GET /api/v1/customers/{id}/profile`
    pub async fn get_customer_profile(
        &self,
        customer_id: &str,
        token: &RequestToken,
    ) -> Result<CustomerProfile, ApiError> {
        let path = format!(
            "/api/v1/customers/{}/profile",
            urlencoding::encode(customer_id)
        );
        let payload = self.fetch_json(&path, token).await?;
        Ok(CustomerProfile::from_value(payload.into_value()))
    }

    /// `GET /api/v1/stats/kpi`
    pub async fn get_kpi(&self, token: &RequestToken) -> Result<KpiSnapshot, ApiError> {
        let payload = self.fetch_json("/api/v1/stats/kpi", token).await?;
        Ok(models::from_payload(payload.into_value()))
    }

    /// `GET /api/v1/sync/health`
    pub async fn get_sync_health(&self, token: &RequestToken) -> Result<SyncHealth, ApiError> {
        let payload = self.fetch_json("/api/v1/sync/health", token).await?;
        Ok(models::from_payload(payload.into_value()))
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn list_customers(
        &self,
        query: &CustomerQuery,
        token: &RequestToken,
    ) -> Result<CustomerListResponse, ApiError> {
        self.get_customers(query, token).await
    }

    async fn customer_profile(
        &self,
        customer_id: &str,
        token: &RequestToken,
    ) -> Result<CustomerProfile, ApiError> {
        self.get_customer_profile(customer_id, token).await
    }

    async fn kpi(&self, token: &RequestToken) -> Result<KpiSnapshot, ApiError> {
        self.get_kpi(token).await
    }

    async fn sync_health(&self, token: &RequestToken) -> Result<SyncHealth, ApiError> {
        self.get_sync_health(token).await
    }
}
