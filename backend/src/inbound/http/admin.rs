//! Admin moderation handlers: dashboard stats and the review queues.

use actix_web::{get, patch, web};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::listing::{ListingId, ReviewDecision};
use crate::domain::marketplace::MarketplaceStats;
use crate::domain::sellers::ModerationAction;
use crate::domain::Error;

use super::auth::UserBody;
use super::error::ApiResult;
use super::listings::ListingBody;
use super::session::SessionContext;
use super::state::HttpState;

/// Payload for a seller-application decision.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SellerDecisionBody {
    /// `approved` or `rejected`.
    pub status: String,
    /// Optional reviewer note, recorded on rejection.
    pub note: Option<String>,
}

/// Payload for a listing review decision.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListingDecisionBody {
    /// `approved` or `rejected`.
    pub status: String,
    /// Reviewer feedback shown to the seller.
    pub comments: Option<String>,
}

/// Payload for a moderation action against a user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModerationBody {
    pub action: ModerationAction,
    pub reason: Option<String>,
}

/// Dashboard counters.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Counters", body = MarketplaceStats),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not an admin")
    ),
    tags = ["admin"],
    operation_id = "adminStats"
)]
#[get("/admin/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MarketplaceStats>> {
    let caller = state.caller(&session).await?;
    let stats = state.listings.stats(&caller).await?;
    Ok(web::Json(stats))
}

/// Users with a seller application awaiting review, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/sellers/pending",
    responses(
        (status = 200, description = "Pending applicants", body = [UserBody]),
        (status = 403, description = "Not an admin")
    ),
    tags = ["admin"],
    operation_id = "pendingSellers"
)]
#[get("/admin/sellers/pending")]
pub async fn pending_sellers(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserBody>>> {
    let caller = state.caller(&session).await?;
    let users = state.sellers.pending_applications(&caller).await?;
    Ok(web::Json(users.iter().map(UserBody::from).collect()))
}

/// Decide a pending seller application. Approval writes status, review
/// timestamp, role, and the approved flag in one step.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/sellers/{id}/status",
    params(("id" = Uuid, Path, description = "Applicant user id")),
    request_body = SellerDecisionBody,
    responses(
        (status = 200, description = "Application decided", body = UserBody),
        (status = 400, description = "Unknown decision"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Unknown user"),
        (status = 409, description = "No pending application")
    ),
    tags = ["admin"],
    operation_id = "decideSellerApplication"
)]
#[patch("/admin/sellers/{id}/status")]
pub async fn decide_seller(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<SellerDecisionBody>,
) -> ApiResult<web::Json<UserBody>> {
    let caller = state.caller(&session).await?;
    let user_id = path.into_inner().into();
    let payload = payload.into_inner();
    let now = chrono::Utc::now();

    let user = match payload.status.as_str() {
        "approved" => state.sellers.approve(&caller, user_id, now).await?,
        "rejected" => {
            state
                .sellers
                .reject(&caller, user_id, payload.note, now)
                .await?
        }
        other => {
            return Err(Error::invalid_request(format!(
                "unknown application decision '{other}'"
            )))
        }
    };
    Ok(web::Json(UserBody::from(&user)))
}

/// Listings awaiting review, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/listings/pending",
    responses(
        (status = 200, description = "Pending listings", body = [ListingBody]),
        (status = 403, description = "Not an admin")
    ),
    tags = ["admin"],
    operation_id = "pendingListings"
)]
#[get("/admin/listings/pending")]
pub async fn pending_listings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListingBody>>> {
    let caller = state.caller(&session).await?;
    let listings = state.listings.pending(&caller).await?;
    Ok(web::Json(listings.iter().map(ListingBody::from).collect()))
}

/// Decide a pending listing. Single shot; re-deciding conflicts.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/listings/{id}/status",
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body = ListingDecisionBody,
    responses(
        (status = 200, description = "Listing decided", body = ListingBody),
        (status = 400, description = "Unknown decision"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Unknown listing"),
        (status = 409, description = "Already reviewed")
    ),
    tags = ["admin"],
    operation_id = "decideListing"
)]
#[patch("/admin/listings/{id}/status")]
pub async fn decide_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ListingDecisionBody>,
) -> ApiResult<web::Json<ListingBody>> {
    let caller = state.caller(&session).await?;
    let id = ListingId::from(path.into_inner());
    let payload = payload.into_inner();

    let decision: ReviewDecision = payload.status.parse().map_err(|()| {
        Error::invalid_request(format!("unknown listing decision '{}'", payload.status))
    })?;
    let listing = state
        .listings
        .review(&caller, id, decision, payload.comments, chrono::Utc::now())
        .await?;
    Ok(web::Json(ListingBody::from(&listing)))
}

/// Moderate a user. `ban` resets their selling capability; `warn` is
/// recorded in the audit log only.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/{id}/moderate",
    params(("id" = Uuid, Path, description = "Target user id")),
    request_body = ModerationBody,
    responses(
        (status = 200, description = "Moderation applied", body = UserBody),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Unknown user")
    ),
    tags = ["admin"],
    operation_id = "moderateUser"
)]
#[patch("/admin/users/{id}/moderate")]
pub async fn moderate_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ModerationBody>,
) -> ApiResult<web::Json<UserBody>> {
    let caller = state.caller(&session).await?;
    let payload = payload.into_inner();
    let user = state
        .sellers
        .moderate(
            &caller,
            path.into_inner().into(),
            payload.action,
            payload.reason.as_deref(),
        )
        .await?;
    Ok(web::Json(UserBody::from(&user)))
}
