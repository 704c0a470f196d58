//! HTTP inbound adapter exposing the REST endpoints.

use actix_web::web;

pub mod admin;
pub mod auth;
pub mod error;
pub mod health;
pub mod listings;
pub mod schemas;
pub mod sellers;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

/// Register every `/api/v1` handler on a scope or service config.
///
/// `/listings/mine` must be registered before `/listings/{id}` so the
/// literal segment wins the route match.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(sellers::apply_seller)
        .service(sellers::onboarding)
        .service(sellers::toggle_wishlist)
        .service(sellers::wishlist)
        .service(listings::browse)
        .service(listings::mine)
        .service(listings::get_one)
        .service(listings::create)
        .service(listings::edit)
        .service(listings::remove)
        .service(listings::mark_sold)
        .service(listings::toggle_like)
        .service(admin::stats)
        .service(admin::pending_sellers)
        .service(admin::decide_seller)
        .service(admin::pending_listings)
        .service(admin::decide_listing)
        .service(admin::moderate_user);
}
