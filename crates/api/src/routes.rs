//! Route configuration.
//!
//! Handlers that accept a request body must extract it with
//! [`ValidatedJson`](crate::extractors::ValidatedJson), never plain
//! `axum::Json`; the extractor is where undeclared properties are rejected.

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::health_routes;
use crate::openapi::{ApiDoc, DOCS_JSON_PATH, DOCS_PATH};
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        // Swagger UI and raw document
        .merge(SwaggerUi::new(DOCS_PATH).url(DOCS_JSON_PATH, ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
