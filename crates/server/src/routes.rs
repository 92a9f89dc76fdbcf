use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::errors::JsonApiError;
use crate::metrics::encode_metrics;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod wallpapers;

/// Multipart overhead allowed on top of the file size limit.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Static media served by the local backend.
#[derive(Clone, Debug)]
pub struct MediaMount {
    /// URL prefix, e.g. `/media`.
    pub path: String,
    pub dir: String,
}

#[derive(Clone, Debug)]
pub struct RouterOptions {
    pub max_file_bytes: usize,
    pub media: Option<MediaMount>,
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn banner() -> &'static str {
    "API is running!"
}

async fn metrics() -> (StatusCode, String) {
    encode_metrics()
}

async fn not_found() -> JsonApiError {
    JsonApiError::not_found_route()
}

/// Build the full application router
pub fn build_router(state: ServerState, cors: CorsLayer, opts: RouterOptions) -> Router {
    let body_limit = opts.max_file_bytes.saturating_add(FORM_OVERHEAD_BYTES);

    let api = Router::new()
        .route(
            "/api/wallpapers",
            get(wallpapers::list).post(wallpapers::upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/wallpapers/categories", get(wallpapers::categories))
        .route("/api/wallpapers/:id", get(wallpapers::get))
        .route("/api/wallpapers/:id/download", put(wallpapers::download))
        .with_state(state);

    let mut app = Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(m) = opts.media {
        app = app.nest_service(&m.path, ServeDir::new(m.dir));
    }

    app.fallback(not_found)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // span per request at INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
