//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::health_handler::{HealthResponse, ServiceHealth, ServiceStatus};
use domain::{User, UserRole};

/// Path of the Swagger UI
pub const DOCS_PATH: &str = "/api";

/// Path of the raw OpenAPI document
pub const DOCS_JSON_PATH: &str = "/api-json";

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Commercial Microservice API",
        description = "Financial Data API",
        version = "1.0"
    ),
    paths(crate::handlers::health_handler::health_check),
    components(schemas(User, UserRole, HealthResponse, ServiceStatus, ServiceHealth)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health endpoints"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
