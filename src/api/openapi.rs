//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::user_handler;
use crate::domain::UserResponse;
use crate::errors::ErrorResponse;

/// OpenAPI documentation for the User Registry API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Registry API",
        version = "0.1.0",
        description = "CRUD REST service for user records with birth-date range search",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        user_handler::create_user,
        user_handler::update_user,
        user_handler::patch_user,
        user_handler::delete_user,
        user_handler::search_users,
    ),
    components(
        schemas(
            UserResponse,
            user_handler::UserRequest,
            user_handler::PatchUserRequest,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "User management operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
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
                        .description(Some("JWT issued by the identity provider"))
                        .build(),
                ),
            );
        }
    }
}
