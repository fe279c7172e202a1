//! HTTP surface of the backend.
//!
//! Builds the axum router: health check, OpenAPI document and Swagger UI,
//! permissive CORS and request tracing. Request bodies are checked by the
//! [`extractors::ValidatedJson`] extractor.

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
