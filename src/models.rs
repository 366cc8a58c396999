use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============ Lenient field decoding ============
//
// The backend owns these schemas. Every field is optional and malformed
// values degrade to "absent" rather than failing the whole page.

/// Decodes any scalar as a string; `null` becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Decodes a non-negative integer from a number or numeric string.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Decodes an array, skipping elements that don't fit; anything else is empty.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Decodes a JSON object; anything else is an empty map.
fn lenient_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

/// Decodes a nested section, falling back to its default when malformed.
fn lenient_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Parses a top-level payload, falling back to the default shape when the
/// body is not an object.
pub fn from_payload<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(value).unwrap_or_default()
}

// ============ Backend records ============

/// A customer record as listed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    #[serde(deserialize_with = "lenient_string")]
    pub customer_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    /// National identity number.
    #[serde(deserialize_with = "lenient_string")]
    pub nik: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date_of_birth: Option<String>,
    /// "L" or "P".
    #[serde(deserialize_with = "lenient_string")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone_number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub province: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub occupation: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub employer_name: Option<String>,
    /// Kept raw; formatted as currency when numeric.
    pub monthly_income: Option<Value>,
    #[serde(deserialize_with = "lenient_string")]
    pub customer_segment: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub credit_score: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub registration_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_updated: Option<String>,
}

/// A credit application owned by a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditApplication {
    #[serde(deserialize_with = "lenient_string")]
    pub application_id: Option<String>,
    /// "Approved", "Pending", "Under Review" or anything else.
    #[serde(deserialize_with = "lenient_string")]
    pub application_status: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub vehicle_brand: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub vehicle_model: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub vehicle_year: Option<String>,
    pub loan_amount: Option<Value>,
    pub outstanding_amount: Option<Value>,
    /// Repayment term in months.
    #[serde(deserialize_with = "lenient_string")]
    pub tenor_months: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub interest_rate: Option<String>,
}

/// A vehicle ownership record owned by a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleOwnership {
    #[serde(deserialize_with = "lenient_string")]
    pub ownership_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub vehicle_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub brand: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub model: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub year: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub ownership_status: Option<String>,
}

// ============ Endpoint responses ============

/// Response of `GET /api/v1/customers`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CustomerListResponse {
    #[serde(deserialize_with = "lenient_vec")]
    pub customers: Vec<Customer>,
    #[serde(deserialize_with = "lenient_u64")]
    pub limit: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub offset: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
}

/// Response of `GET /api/v1/customers/{id}/profile`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerProfile {
    pub customer: Option<Customer>,
    pub credit_applications: Vec<CreditApplication>,
    pub vehicle_ownership: Vec<VehicleOwnership>,
    /// The untouched response body.
    pub raw: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileBody {
    #[serde(deserialize_with = "lenient_section")]
    customer: Option<Customer>,
    #[serde(deserialize_with = "lenient_vec")]
    credit_applications: Vec<CreditApplication>,
    #[serde(deserialize_with = "lenient_vec")]
    vehicle_ownership: Vec<VehicleOwnership>,
}

impl CustomerProfile {
    /// Builds a profile from the raw response body, keeping the body for display.
    pub fn from_value(raw: Value) -> Self {
        let body: ProfileBody = from_payload(raw.clone());
        Self {
            customer: body.customer,
            credit_applications: body.credit_applications,
            vehicle_ownership: body.vehicle_ownership,
            raw,
        }
    }

    /// True when the backend returned no body at all.
    pub fn is_empty(&self) -> bool {
        self.raw.is_null()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CustomerKpi {
    pub total: Option<Value>,
    pub active: Option<Value>,
    #[serde(deserialize_with = "lenient_map")]
    pub by_segment: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CreditApplicationKpi {
    pub total: Option<Value>,
    #[serde(deserialize_with = "lenient_map")]
    pub by_status: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleOwnershipKpi {
    pub total: Option<Value>,
}

/// Response of `GET /api/v1/stats/kpi`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KpiSnapshot {
    #[serde(deserialize_with = "lenient_section")]
    pub customers: CustomerKpi,
    #[serde(deserialize_with = "lenient_section")]
    pub credit_applications: CreditApplicationKpi,
    #[serde(deserialize_with = "lenient_section")]
    pub vehicle_ownership: VehicleOwnershipKpi,
}

/// Health of the replication pipeline feeding the backend store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Ok,
    Warn,
    Bad,
    Unknown,
}

impl SyncStatus {
    /// Parses a backend status string case-insensitively.
    ///
    /// A missing status is `Unknown`; any unrecognised value is `Bad`.
    pub fn parse(status: Option<&str>) -> Self {
        match status.map(|s| s.trim().to_ascii_lowercase()) {
            None => SyncStatus::Unknown,
            Some(s) if s.is_empty() || s == "unknown" => SyncStatus::Unknown,
            Some(s) if s == "ok" => SyncStatus::Ok,
            Some(s) if s == "warn" => SyncStatus::Warn,
            Some(_) => SyncStatus::Bad,
        }
    }
}

/// Response of `GET /api/v1/sync/health`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncHealth {
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
    pub sla_target_seconds: Option<Value>,
    pub lag_seconds: Option<Value>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_success_at: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_error: Option<String>,
}

impl SyncHealth {
    pub fn status_kind(&self) -> SyncStatus {
        SyncStatus::parse(self.status.as_deref())
    }
}
