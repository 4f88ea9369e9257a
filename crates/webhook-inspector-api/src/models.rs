use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use webhook_inspector_db::entities::webhook;
use webhook_inspector_db::StoreError;

/// Captured webhook as shown in the list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSummary {
    /// Time-ordered webhook ID
    pub id: String,
    /// HTTP method
    pub method: String,
    /// Request path with the capture prefix removed
    pub pathname: String,
    /// Capture timestamp
    pub created_at: DateTime<Utc>,
}

impl From<webhook::Summary> for WebhookSummary {
    fn from(row: webhook::Summary) -> Self {
        Self {
            id: row.id,
            method: row.method,
            pathname: row.pathname,
            created_at: row.created_at,
        }
    }
}

/// One page of captured webhooks, newest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookList {
    pub webhooks: Vec<WebhookSummary>,
    /// Pass as `cursor` to fetch the next page; null on the last page
    pub next_cursor: Option<String>,
}

/// Full captured webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDetail {
    pub id: String,
    pub method: String,
    pub pathname: String,
    /// Address of the client that sent the webhook
    pub client_ip: String,
    pub status_code: i32,
    pub content_type: Option<String>,
    pub content_length: Option<i32>,
    pub query_params: Option<BTreeMap<String, String>>,
    pub headers: BTreeMap<String, String>,
    /// Request body as text (JSON bodies pretty-printed)
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<webhook::Model> for WebhookDetail {
    type Error = StoreError;

    fn try_from(model: webhook::Model) -> Result<Self, Self::Error> {
        let headers = model.header_map()?;
        let query_params = model.query_param_map()?;

        Ok(Self {
            id: model.id,
            method: model.method,
            pathname: model.pathname,
            client_ip: model.ip,
            status_code: model.status_code,
            content_type: model.content_type,
            content_length: model.content_length,
            query_params,
            headers,
            body: model.body,
            created_at: model.created_at,
        })
    }
}

/// Query parameters for listing webhooks
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListWebhooksQuery {
    /// Page size (1-100, default: 20)
    #[serde(default)]
    pub limit: Option<u64>,
    /// ID of the last webhook of the previous page
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Response to a captured webhook
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaptureResponse {
    /// ID of the stored webhook
    pub id: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Deployment environment
    pub environment: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub message: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
