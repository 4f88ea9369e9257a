use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};
use webhook_inspector_db::{PageLimit, PageRequest, RecordId};

use crate::error::ApiError;
use crate::models::*;
use crate::AppState;

/// Turn raw list query parameters into a validated page request
pub fn page_request(query: &ListWebhooksQuery) -> Result<PageRequest, ApiError> {
    let limit = match query.limit {
        Some(limit) => PageLimit::try_from(limit)?,
        None => PageLimit::default(),
    };

    let cursor = match query.cursor.as_deref().map(str::trim) {
        Some(cursor) if !cursor.is_empty() => Some(RecordId::parse(cursor)?),
        _ => None,
    };

    Ok(PageRequest { limit, cursor })
}

/// List captured webhooks, newest first
#[utoipa::path(
    get,
    path = "/api/webhooks",
    params(ListWebhooksQuery),
    responses(
        (status = 200, description = "Page of captured webhooks", body = WebhookList),
        (status = 400, description = "Invalid limit or cursor", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn list_webhooks(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListWebhooksQuery>, QueryRejection>,
) -> Result<Json<WebhookList>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    debug!("Listing webhooks: {:?}", query);

    let request = page_request(&query)?;
    let page = state.store.list(&request).await?;
    let page = page.map(WebhookSummary::from);

    Ok(Json(WebhookList {
        webhooks: page.items,
        next_cursor: page.next_cursor,
    }))
}

/// Get a specific webhook by ID
#[utoipa::path(
    get,
    path = "/api/webhooks/{id}",
    params(
        ("id" = String, Path, description = "Webhook ID")
    ),
    responses(
        (status = 200, description = "Captured webhook details", body = WebhookDetail),
        (status = 400, description = "Malformed webhook ID", body = ErrorResponse),
        (status = 404, description = "Webhook not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn get_webhook(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WebhookDetail>, ApiError> {
    debug!("Getting webhook: {}", id);

    let id = RecordId::parse(&id)?;
    let model = state.store.find(&id).await?.ok_or(ApiError::NotFound)?;

    Ok(Json(WebhookDetail::try_from(model)?))
}

/// Delete a specific webhook by ID
#[utoipa::path(
    delete,
    path = "/api/webhooks/{id}",
    params(
        ("id" = String, Path, description = "Webhook ID")
    ),
    responses(
        (status = 204, description = "Webhook deleted"),
        (status = 400, description = "Malformed webhook ID", body = ErrorResponse),
        (status = 404, description = "Webhook not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn delete_webhook(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = RecordId::parse(&id)?;

    if !state.store.delete(&id).await? {
        return Err(ApiError::NotFound);
    }

    info!(%id, "Deleted webhook");
    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.clone(),
    })
}
