//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.
//!
//! All endpoints are mounted under `/api`.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::http::{HeaderValue, header};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::LedgerConfig;

/// Builds the API router with all REST endpoints.
pub fn build_router(dev_routes_enabled: bool) -> Router<AppState> {
    Router::new().nest("/api", handlers::routes(dev_routes_enabled))
}

/// Builds the complete application: routes, Swagger UI (when the
/// `swagger-ui` feature is on) and the HTTP middleware stack. Every
/// response carries `Cache-Control: no-store`.
pub fn build_app(state: AppState, config: &LedgerConfig) -> Router {
    let router = build_router(config.dev_routes_enabled);

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", openapi::document()),
    );

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                ))
                .layer(TimeoutLayer::new(config.request_timeout())),
        )
        .with_state(state)
}
