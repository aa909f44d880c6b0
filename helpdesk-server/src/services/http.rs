use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::attachments::MAX_ATTACHMENTS;
use crate::auth::require_auth;
use crate::core::{Config, ServerState};

/// Room for the text fields of a multipart ticket form
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// HTTP access log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::tickets::router())
        .merge(crate::api::dashboard::router())
        .merge(crate::api::upload::router())
}

/// Build the full application: routes, authorization gate, body limit,
/// CORS and access log
pub fn build_router(state: ServerState) -> Router {
    let config = state.config.clone();
    let body_limit = config.max_upload_bytes * MAX_ATTACHMENTS + FORM_OVERHEAD_BYTES;

    build_app()
        // require_auth skips public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(cors_layer(&config))
        .layer(middleware::from_fn(log_request))
}

/// CORS from the configured origin list
///
/// With no origins configured, development allows any origin and other
/// environments allow none.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return if config.is_development() {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        };
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
