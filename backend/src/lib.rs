//! Campus marketplace backend.
//!
//! The crate follows a hexagonal layout: `domain` holds the aggregates,
//! state machines, and port traits; `inbound::http` adapts them to REST
//! handlers; `outbound::persistence` provides the document-store adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
