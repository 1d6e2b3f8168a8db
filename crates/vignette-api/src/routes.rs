//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use vignette_core::Config;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    // Leave headroom for multipart framing around the payload itself.
    let body_limit = state.max_upload_size_bytes + 64 * 1024;

    let router = Router::new()
        .route("/api/v0/files/presign", post(handlers::files::presign_upload))
        .route(
            "/api/v0/files/confirm/{file_id}",
            post(handlers::files::confirm_upload),
        )
        .route("/api/v0/files/upload", post(handlers::files::direct_upload))
        .route("/api/v0/files/{file_id}", get(handlers::files::get_file))
        .route(
            "/api/v0/files/{file_id}/download-url",
            get(handlers::files::download_url),
        )
        .route(
            "/api/v0/files/{file_id}/thumbnails",
            get(handlers::thumbnails::list_file_thumbnails),
        )
        .route(
            "/api/v0/thumbnails/{id}",
            get(handlers::thumbnails::get_thumbnail),
        )
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let router = router
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/docs"))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(router)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", origin, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Ok(cors)
}
