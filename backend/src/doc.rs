//! OpenAPI documentation configuration.
//!
//! Registers every REST endpoint and the schema wrappers for the error
//! types. The generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus market API",
        description = "Campus marketplace backend: listings, seller onboarding, and moderation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::sellers::apply_seller,
        crate::inbound::http::sellers::onboarding,
        crate::inbound::http::sellers::toggle_wishlist,
        crate::inbound::http::sellers::wishlist,
        crate::inbound::http::listings::browse,
        crate::inbound::http::listings::mine,
        crate::inbound::http::listings::get_one,
        crate::inbound::http::listings::create,
        crate::inbound::http::listings::edit,
        crate::inbound::http::listings::remove,
        crate::inbound::http::listings::mark_sold,
        crate::inbound::http::listings::toggle_like,
        crate::inbound::http::admin::stats,
        crate::inbound::http::admin::pending_sellers,
        crate::inbound::http::admin::decide_seller,
        crate::inbound::http::admin::pending_listings,
        crate::inbound::http::admin::decide_listing,
        crate::inbound::http::admin::moderate_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "users", description = "Seller onboarding and wishlist"),
        (name = "listings", description = "Marketplace browsing and the listing lifecycle"),
        (name = "admin", description = "Moderation queues and dashboard"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::schema::Schema;
    use utoipa::openapi::RefOr;
    use utoipa::OpenApi;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        match error_schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(obj.properties.contains_key("code"));
                assert!(obj.properties.contains_key("message"));
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_document_covers_listing_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/listings"));
        assert!(doc.paths.paths.contains_key("/api/v1/listings/{id}/sold"));
        assert!(doc.paths.paths.contains_key("/api/v1/admin/sellers/{id}/status"));
    }
}
