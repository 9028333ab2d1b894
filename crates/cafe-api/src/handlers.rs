//! # Request Handlers
//!
//! Axum request handlers for the CafeRadius API.
//! Each handler makes at most one Record Store call and translates its
//! errors into a JSON `{ "error": ... }` body.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use cafe_core::{Cafe, NewVoucher, StoreError, Voucher};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

/// Body of every failed voucher lookup, whatever the cause
pub const VOUCHER_NOT_FOUND: &str = "Voucher nicht gefunden";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create voucher request.
///
/// Both fields are forwarded to the store as sent, without validation.
/// `None` means the key was missing; an explicit `null` is `Some(Value::Null)`.
#[derive(Debug, Default, PartialEq)]
pub struct IssueVoucherRequest {
    pub cafe_id: Option<Value>,
    pub device_id: Option<Value>,
}

impl IssueVoucherRequest {
    /// Take the two fields from a decoded body. Only objects carry fields.
    pub fn from_body(body: &Value) -> Self {
        match body {
            Value::Object(fields) => Self {
                cafe_id: fields.get("cafe_id").cloned(),
                device_id: fields.get("device_id").cloned(),
            },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub message: &'static str,
    pub has_supabase_url: bool,
    pub has_supabase_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_env: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CafesResponse {
    pub cafes: Vec<Cafe>,
}

#[derive(Debug, Serialize)]
pub struct VoucherResponse {
    pub voucher: Voucher,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn store_error_to_response(err: StoreError) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(err.message())),
    )
}

fn voucher_not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(VOUCHER_NOT_FOUND)),
    )
}

fn invalid_body(reason: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(format!("Invalid JSON body: {}", reason))),
    )
}

/// Decode the create-voucher body.
///
/// Non-JSON content types and empty bodies count as `{}`, as do JSON arrays.
/// A JSON body whose top level is a scalar is rejected with 400.
fn decode_issue_request(headers: &HeaderMap, body: &[u8]) -> Result<IssueVoucherRequest, ApiError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"));

    if !is_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(IssueVoucherRequest::default());
    }

    let value: Value = serde_json::from_slice(body).map_err(invalid_body)?;
    match value {
        Value::Object(_) | Value::Array(_) => Ok(IssueVoucherRequest::from_body(&value)),
        _ => Err(invalid_body("expected an object or array")),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness check, independent of the store
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Static confirmation message
pub async fn smoke_test() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "CafeRadius Backend läuft!" }))
}

/// Reports which store credentials are present (never their values)
pub async fn debug_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(DebugResponse {
        message: "Debug Info",
        has_supabase_url: state.config.has_supabase_url,
        has_supabase_key: state.config.has_supabase_key,
        node_env: state.config.node_env.clone(),
    })
}

/// List every café
#[instrument(skip(state))]
pub async fn list_cafes(State(state): State<AppState>) -> Result<Json<CafesResponse>, ApiError> {
    let cafes = state.store.list_cafes().await.map_err(|e| {
        error!("Failed to list cafes: {}", e);
        store_error_to_response(e)
    })?;

    Ok(Json(CafesResponse { cafes }))
}

/// Issue a voucher valid for 24 hours
#[instrument(skip(state, headers, body))]
pub async fn create_voucher(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<VoucherResponse>, ApiError> {
    let request = decode_issue_request(&headers, &body)?;
    let new_voucher = NewVoucher::issue(request.cafe_id, request.device_id);

    let voucher = state
        .store
        .insert_voucher(&new_voucher)
        .await
        .map_err(|e| {
            error!("Failed to create voucher {}: {}", new_voucher.code, e);
            store_error_to_response(e)
        })?;

    info!(
        "Created voucher: code={}, valid_until={}",
        voucher.code, new_voucher.valid_until
    );

    Ok(Json(VoucherResponse { voucher }))
}

/// Look up a voucher by exact code, with its café embedded
#[instrument(skip(state))]
pub async fn verify_voucher(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<VoucherResponse>, ApiError> {
    let voucher = state.store.find_voucher(&code).await.map_err(|e| {
        if e.is_lookup_miss() {
            info!("Voucher lookup missed: {}", e);
        } else {
            warn!("Voucher lookup failed: {}", e);
        }
        voucher_not_found()
    })?;

    if state.config.enforce_expiry && voucher.is_expired_at(Utc::now()) {
        info!("Voucher {} has expired", voucher.code);
        return Err(voucher_not_found());
    }

    Ok(Json(VoucherResponse { voucher }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn test_store_error_conversion() {
        let err = StoreError::Rejected {
            status: 401,
            code: None,
            message: "Invalid API key".into(),
        };
        let (status, body) = store_error_to_response(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Invalid API key");
    }

    #[test]
    fn test_decode_passes_values_through() {
        let body = br#"{"cafe_id": 7, "device_id": {"model": "Pixel"}, "extra": true}"#;
        let request = decode_issue_request(&json_headers(), body).unwrap();

        assert_eq!(request.cafe_id, Some(json!(7)));
        assert_eq!(request.device_id, Some(json!({"model": "Pixel"})));
    }

    #[test]
    fn test_decode_empty_or_non_json_is_empty_request() {
        let request = decode_issue_request(&json_headers(), b"  ").unwrap();
        assert!(request.cafe_id.is_none());

        let request = decode_issue_request(&HeaderMap::new(), b"cafe_id=c1").unwrap();
        assert!(request.cafe_id.is_none());
        assert!(request.device_id.is_none());
    }

    #[test]
    fn test_decode_keeps_explicit_null() {
        let request = decode_issue_request(&json_headers(), br#"{"cafe_id": null}"#).unwrap();
        assert_eq!(request.cafe_id, Some(Value::Null));
        assert_eq!(request.device_id, None);

        // The null survives into the insert payload; the missing key does not
        let payload = serde_json::to_value(NewVoucher::issue(request.cafe_id, request.device_id))
            .unwrap();
        let payload = payload.as_object().unwrap();
        assert_eq!(payload.get("cafe_id"), Some(&Value::Null));
        assert!(!payload.contains_key("device_id"));
    }

    #[test]
    fn test_decode_array_carries_no_fields() {
        let request = decode_issue_request(&json_headers(), br#"["c1", "d1"]"#).unwrap();
        assert_eq!(request, IssueVoucherRequest::default());
    }

    #[test]
    fn test_decode_scalar_is_rejected() {
        let bodies: [&[u8]; 4] = [b"42", b"\"c1\"", b"null", b"true"];
        for body in bodies {
            let (status, _) = decode_issue_request(&json_headers(), body).unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_decode_malformed_json() {
        let (status, body) = decode_issue_request(&json_headers(), b"{not json").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.starts_with("Invalid JSON body"));
    }

    #[test]
    fn test_debug_response_shape() {
        let body = serde_json::to_value(DebugResponse {
            message: "Debug Info",
            has_supabase_url: true,
            has_supabase_key: false,
            node_env: None,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({ "message": "Debug Info", "hasSupabaseUrl": true, "hasSupabaseKey": false })
        );
    }
}
