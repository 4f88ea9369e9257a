pub mod capture;
pub mod error;
pub mod handlers;
pub mod models;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Response, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use rust_embed::RustEmbed;
use std::{future::Future, net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use webhook_inspector_db::WebhookStore;

pub use error::ApiError;

#[derive(RustEmbed)]
#[folder = "assets"]
struct ViewerAssets;

/// Default cap on captured body size (16 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub store: WebhookStore,
    pub environment: String,
    pub max_body_bytes: usize,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Webhook Inspector API",
        version = "0.1.0",
        description = "Capture and inspect incoming webhook requests"
    ),
    paths(
        handlers::list_webhooks,
        handlers::get_webhook,
        handlers::delete_webhook,
        handlers::health_check,
    ),
    components(
        schemas(
            models::WebhookSummary,
            models::WebhookList,
            models::WebhookDetail,
            models::ListWebhooksQuery,
            models::CaptureResponse,
            models::HealthResponse,
            models::ErrorResponse,
        )
    ),
    tags(
        (name = "webhooks", description = "Captured webhook inspection endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for browser clients on other origins
    pub enable_cors: bool,
    /// Environment name reported by the health endpoint
    pub environment: String,
    /// Largest request body the capture endpoint will read
    pub max_body_bytes: usize,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3333)),
            enable_cors: true,
            environment: "development".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, store: WebhookStore) -> Self {
        let state = Arc::new(AppState {
            store,
            environment: config.environment.clone(),
            max_body_bytes: config.max_body_bytes,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let capture_router = Router::new()
            .route("/capture", any(capture::capture_webhook))
            .route("/capture/", any(capture::capture_webhook))
            .route("/capture/{*path}", any(capture::capture_webhook))
            .with_state(self.state.clone());

        let api_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/webhooks", get(handlers::list_webhooks))
            .route(
                "/api/webhooks/{id}",
                get(handlers::get_webhook).delete(handlers::delete_webhook),
            )
            .with_state(self.state.clone());

        // SwaggerUi also serves the OpenAPI document at /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/docs").url("/api/openapi.json", api_doc))
            .merge(capture_router)
            .merge(api_router)
            .fallback(serve_viewer);

        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> Result<(), anyhow::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!("Capture endpoint: http://{}/capture/*", self.config.bind_addr);
        info!("API docs: http://{}/docs", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

/// Serve the embedded viewer UI
async fn serve_viewer(req: axum::extract::Request) -> impl IntoResponse {
    let path = req.uri().path().trim_start_matches('/');

    if path.starts_with("api/") || path == "api" {
        return (
            StatusCode::NOT_FOUND,
            Json(models::ErrorResponse {
                message: "Route not found.".to_string(),
                code: Some("ROUTE_NOT_FOUND".to_string()),
            }),
        )
            .into_response();
    }

    if let Some(content) = ViewerAssets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return asset_response(content.data.into_owned(), mime.as_ref());
    }

    // Unknown non-API paths fall back to the single page viewer
    match ViewerAssets::get("index.html") {
        Some(content) => asset_response(content.data.into_owned(), "text/html; charset=utf-8"),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

fn asset_response(data: Vec<u8>, mime: &str) -> axum::response::Response {
    let mut response = Response::new(Body::from(data));
    if let Ok(value) = HeaderValue::from_str(mime) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response.into_response()
}
