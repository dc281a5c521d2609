use axum::{http::HeaderValue, routing::get, Extension, Router};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers;
use crate::services::DashboardService;

/// Route table, shared by the binary and the integration tests.
pub fn app(service: DashboardService, security: &SecurityConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::home::get))
        .route("/health", get(handlers::health::get))
        // Dashboard datasources
        .merge(dashboard_routes())
        .layer(Extension(service))
        .layer(TraceLayer::new_for_http());

    match cors_layer(security) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn dashboard_routes() -> Router {
    Router::new()
        .route("/restaurants-cache", get(handlers::restaurants::get))
        .route("/latest-orders", get(handlers::latest_orders::get))
        .route("/dead-letters-specific", get(handlers::dead_letters::get))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    Some(CorsLayer::new().allow_origin(AllowOrigin::list(origins)))
}
