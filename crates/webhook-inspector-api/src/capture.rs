//! Capture endpoint
//!
//! Everything under `/capture` is recorded as-is, whatever the method, headers
//! or body. A capture only fails when the body cannot be read (too large or a
//! broken stream) or when storage fails.

use axum::{
    extract::{ConnectInfo, Query, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    Json,
};
use http_body_util::LengthLimitError;
use serde_json::Value;
use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};
use tracing::{info, instrument, warn};
use webhook_inspector_db::NewWebhook;

use crate::error::ApiError;
use crate::models::CaptureResponse;
use crate::AppState;

/// URL prefix stripped from captured paths
pub const CAPTURE_PREFIX: &str = "/capture";

/// Client address recorded when the connection info is not available
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Body of a captured request before it is stored
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedBody {
    Absent,
    Text(String),
    Json(Value),
}

impl CapturedBody {
    /// Classify raw body bytes using the request content type.
    ///
    /// JSON that fails to parse is kept verbatim as text.
    pub fn from_bytes(content_type: Option<&str>, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return CapturedBody::Absent;
        }

        if content_type.is_some_and(is_json_media_type) {
            if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
                return CapturedBody::Json(value);
            }
        }

        CapturedBody::Text(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Textual form persisted in the `body` column
    pub fn into_text(self) -> Option<String> {
        match self {
            CapturedBody::Absent | CapturedBody::Json(Value::Null) => None,
            CapturedBody::Text(text) => Some(text),
            CapturedBody::Json(Value::String(text)) => Some(text),
            CapturedBody::Json(value) => {
                Some(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
            }
        }
    }
}

fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || essence.ends_with("+json")
}

/// Path with the capture prefix removed; the bare prefix maps to `/`
pub fn strip_capture_prefix(path: &str) -> String {
    match path.strip_prefix(CAPTURE_PREFIX) {
        Some("") => "/".to_string(),
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}

/// Flatten headers into a map, joining repeated headers with ", "
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), joined)
        })
        .collect()
}

/// Declared body length; negative or oversized values are dropped
fn content_length(headers: &HeaderMap) -> Option<i32> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u32>().ok())
        .and_then(|len| i32::try_from(len).ok())
}

fn body_read_error(err: axum::Error, limit: usize) -> ApiError {
    let err = err.into_inner();

    if err.downcast_ref::<LengthLimitError>().is_some() {
        warn!(limit, "Payload exceeds size limit");
        ApiError::PayloadTooLarge { limit }
    } else {
        warn!(error = %err, "Failed to read request body");
        ApiError::UnreadableBody(err.to_string())
    }
}

fn query_params(parts: &Parts) -> Option<BTreeMap<String, String>> {
    parts.uri.query()?;

    Query::<BTreeMap<String, String>>::try_from_uri(&parts.uri)
        .ok()
        .map(|Query(params)| params)
        .filter(|params| !params.is_empty())
}

fn client_ip(parts: &Parts) -> String {
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Capture any request under the capture prefix
#[instrument(
    name = "capture_webhook",
    skip(state, request),
    fields(method = %request.method(), path = %request.uri().path())
)]
pub async fn capture_webhook(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<CaptureResponse>), ApiError> {
    let (parts, body) = request.into_parts();

    let limit = state.max_body_bytes;
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| body_read_error(e, limit))?;

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_length = content_length(&parts.headers);

    let body = CapturedBody::from_bytes(content_type.as_deref(), &bytes).into_text();

    let webhook = NewWebhook {
        method: parts.method.as_str().to_string(),
        pathname: strip_capture_prefix(parts.uri.path()),
        ip: client_ip(&parts),
        status_code: 200,
        content_type,
        content_length,
        query_params: query_params(&parts),
        headers: flatten_headers(&parts.headers),
        body,
    };

    let stored = state.store.insert(webhook).await?;
    info!(id = %stored.id, "Captured webhook");

    Ok((StatusCode::CREATED, Json(CaptureResponse { id: stored.id })))
}
