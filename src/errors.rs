use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Body of a backend response, as far as it could be understood.
///
/// A body that is not valid JSON is kept as raw text instead of failing the
/// request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Empty response body.
    Empty,
    /// Body parsed as JSON.
    Json(serde_json::Value),
    /// Body that failed to parse as JSON.
    Text(String),
}

impl Payload {
    /// Parses a response body, degrading to raw text on invalid JSON.
    pub fn from_body(text: String) -> Self {
        if text.is_empty() {
            return Payload::Empty;
        }
        match serde_json::from_str(&text) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(text),
        }
    }

    /// Returns the payload as a JSON value (`null` when empty, a JSON string
    /// for raw text).
    pub fn into_value(self) -> serde_json::Value {
        match self {
            Payload::Empty => serde_json::Value::Null,
            Payload::Json(value) => value,
            Payload::Text(text) => serde_json::Value::String(text),
        }
    }

    /// The `error` field of a JSON object payload, if it holds a truthy value.
    pub fn error_field(&self) -> Option<String> {
        let Payload::Json(serde_json::Value::Object(map)) = self else {
            return None;
        };
        match map.get("error")? {
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Failure of a backend request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Network or transport failure (connection refused, timeout, body read).
    #[error("{0}")]
    Transport(String),
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}{}", with_leading_space(.message))]
    Http {
        status: u16,
        message: String,
        payload: Payload,
    },
    /// The request was abandoned because its token was cancelled.
    #[error("request cancelled")]
    Cancelled,
    /// The request could not be built (bad base URL, client setup).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status of the backend response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

fn with_leading_space(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!(" {}", text)
    }
}

/// Errors returned by the dashboard's own JSON endpoints.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Resource not found error.
    NotFound(String),
    /// Error interacting with the backend API.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each variant to a status code and a `{ "error": ... }` body,
    /// logging according to severity.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http { status: 404, .. } => AppError::NotFound(err.to_string()),
            ApiError::InvalidRequest(msg) => AppError::InternalError(msg),
            other => AppError::ExternalApiError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_falls_back_to_text() {
        assert_eq!(Payload::from_body(String::new()), Payload::Empty);
        assert_eq!(
            Payload::from_body("<html>bad gateway</html>".to_string()),
            Payload::Text("<html>bad gateway</html>".to_string())
        );
        assert_eq!(
            Payload::from_body(r#"{"ok":true}"#.to_string()),
            Payload::Json(json!({"ok": true}))
        );
    }

    #[test]
    fn test_error_field_requires_truthy_value() {
        let payload = Payload::Json(json!({"error": "not found"}));
        assert_eq!(payload.error_field().as_deref(), Some("not found"));

        assert_eq!(Payload::Json(json!({"error": ""})).error_field(), None);
        assert_eq!(Payload::Json(json!({"error": null})).error_field(), None);
        assert_eq!(Payload::Json(json!({"error": 0})).error_field(), None);
        assert_eq!(Payload::Json(json!(["error"])).error_field(), None);
        assert_eq!(Payload::Text("error".into()).error_field(), None);
        assert_eq!(
            Payload::Json(json!({"error": 42})).error_field().as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_http_error_display() {
        let err = ApiError::Http {
            status: 404,
            message: "not found".to_string(),
            payload: Payload::Empty,
        };
        assert_eq!(err.to_string(), "HTTP 404 not found");
        assert_eq!(err.status(), Some(404));

        let unnamed = ApiError::Http {
            status: 599,
            message: String::new(),
            payload: Payload::Empty,
        };
        assert_eq!(unnamed.to_string(), "HTTP 599");
    }

    #[test]
    fn test_app_error_from_api_error() {
        let not_found = ApiError::Http {
            status: 404,
            message: "not found".to_string(),
            payload: Payload::Empty,
        };
        assert!(matches!(AppError::from(not_found), AppError::NotFound(_)));
        assert!(matches!(
            AppError::from(ApiError::Transport("refused".into())),
            AppError::ExternalApiError(_)
        ));
    }

    #[test]
    fn test_app_error_status_codes() {
        let resp = AppError::NotFound("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = AppError::ExternalApiError("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let resp = AppError::InternalError("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
