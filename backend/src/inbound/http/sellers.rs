//! Seller self-service handlers: application, onboarding, and wishlist.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::Role;

use super::auth::UserBody;
use super::error::ApiResult;
use super::listings::ListingBody;
use super::session::SessionContext;
use super::state::HttpState;

/// Payload for a seller application.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyRequestBody {
    /// Why the user wants to sell. Minimum twenty characters.
    pub reason: String,
    /// Category of goods the applicant intends to sell.
    pub category: String,
}

/// Outcome of a seller application.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponseBody {
    pub application_status: String,
}

/// Payload for the one-time role selection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OnboardingRequestBody {
    /// `customer` or `seller`.
    pub role: Role,
}

/// Outcome of a wishlist toggle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponseBody {
    pub favourited: bool,
    pub wishlist: Vec<String>,
}

/// Apply to become a seller. Re-application after rejection is allowed;
/// applying while a review is pending conflicts.
#[utoipa::path(
    post,
    path = "/api/v1/users/apply-seller",
    request_body = ApplyRequestBody,
    responses(
        (status = 200, description = "Application submitted", body = ApplyResponseBody),
        (status = 400, description = "Reason too short or category missing"),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "Already a seller or already pending")
    ),
    tags = ["users"],
    operation_id = "applyForSeller"
)]
#[post("/users/apply-seller")]
pub async fn apply_seller(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ApplyRequestBody>,
) -> ApiResult<web::Json<ApplyResponseBody>> {
    let caller = state.caller(&session).await?;
    let status = state
        .sellers
        .apply(&caller, &payload.reason, &payload.category, chrono::Utc::now())
        .await?;
    Ok(web::Json(ApplyResponseBody {
        application_status: status.as_str().to_owned(),
    }))
}

/// Record the user's initial role choice. Choosing `seller` starts the
/// application flow separately; it does not grant selling rights.
#[utoipa::path(
    post,
    path = "/api/v1/users/onboarding",
    request_body = OnboardingRequestBody,
    responses(
        (status = 200, description = "Onboarding recorded", body = UserBody),
        (status = 400, description = "Admin is not a selectable role"),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "Approved sellers cannot drop to customer")
    ),
    tags = ["users"],
    operation_id = "completeOnboarding"
)]
#[post("/users/onboarding")]
pub async fn onboarding(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OnboardingRequestBody>,
) -> ApiResult<web::Json<UserBody>> {
    let caller = state.caller(&session).await?;
    let user = state
        .sellers
        .complete_onboarding(&caller, payload.role)
        .await?;
    Ok(web::Json(UserBody::from(&user)))
}

/// Toggle a listing on the calling user's wishlist.
#[utoipa::path(
    post,
    path = "/api/v1/users/wishlist/{id}",
    params(("id" = uuid::Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Wishlist toggled", body = WishlistResponseBody),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Unknown listing")
    ),
    tags = ["users"],
    operation_id = "toggleWishlist"
)]
#[post("/users/wishlist/{id}")]
pub async fn toggle_wishlist(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<web::Json<WishlistResponseBody>> {
    let caller = state.caller(&session).await?;
    let outcome = state
        .listings
        .toggle_wishlist(&caller, path.into_inner().into())
        .await?;
    Ok(web::Json(WishlistResponseBody {
        favourited: outcome.favourited,
        wishlist: outcome.wishlist.iter().map(ToString::to_string).collect(),
    }))
}

/// The calling user's wishlist, resolved to listings. Stale entries for
/// listings deleted since they were saved are silently dropped.
#[utoipa::path(
    get,
    path = "/api/v1/users/wishlist",
    responses(
        (status = 200, description = "Wishlist listings", body = [ListingBody]),
        (status = 401, description = "Not logged in")
    ),
    tags = ["users"],
    operation_id = "getWishlist"
)]
#[get("/users/wishlist")]
pub async fn wishlist(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListingBody>>> {
    let caller = state.caller(&session).await?;
    let listings = state.listings.wishlist(&caller).await?;
    Ok(web::Json(listings.iter().map(ListingBody::from).collect()))
}
