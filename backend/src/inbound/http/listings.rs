//! Listing HTTP handlers: public browse/read plus the seller-facing
//! lifecycle endpoints.

use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::listing::{
    Condition, LikeOutcome, Listing, ListingDraft, ListingId, ViewerIdentity,
};
use crate::domain::marketplace::{ListingFilter, SortOrder};
use crate::domain::Error;

use super::error::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Listing as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub images: Vec<String>,
    pub seller: SellerBody,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_comments: Option<String>,
    pub is_sold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_at: Option<String>,
    pub views: u64,
    pub likes: u64,
    pub created_at: String,
}

/// Seller snapshot embedded in listing responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub verified: bool,
}

impl From<&Listing> for ListingBody {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.to_string(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price.amount(),
            category: listing.category.clone(),
            condition: listing.condition.to_string(),
            location: listing.location.clone(),
            images: listing.images.clone(),
            seller: SellerBody {
                id: listing.seller.id.to_string(),
                name: listing.seller.name.clone(),
                verified: listing.seller.verified,
            },
            status: listing.status.to_string(),
            admin_comments: listing.admin_comments.clone(),
            is_sold: listing.is_sold,
            sold_at: listing.sold_at.map(|at| at.to_rfc3339()),
            views: listing.views,
            likes: listing.likes,
            created_at: listing.created_at.to_rfc3339(),
        }
    }
}

/// Payload for creating or editing a listing.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequestBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub category: String,
    pub condition: String,
    pub location: Option<String>,
    pub images: Vec<String>,
}

impl ListingRequestBody {
    fn into_draft(self) -> Result<ListingDraft, Error> {
        let condition: Condition = self.condition.parse().map_err(|()| {
            Error::invalid_request(format!("unknown condition '{}'", self.condition))
        })?;
        Ok(ListingDraft {
            title: self.title,
            description: self.description,
            price: self.price,
            category: self.category,
            condition,
            location: self.location,
            images: self.images,
        })
    }
}

/// Marketplace query parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListingQueryParams {
    /// Free-text search over title and description.
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Comma-separated condition names.
    pub condition: Option<String>,
    pub location: Option<String>,
    /// One of `newest`, `price_asc`, `price_desc`, `popular`.
    pub sort: Option<String>,
}

impl ListingQueryParams {
    fn into_filter(self) -> Result<ListingFilter, Error> {
        let mut conditions = Vec::new();
        if let Some(raw) = &self.condition {
            for part in raw.split(',').filter(|part| !part.trim().is_empty()) {
                let condition: Condition = part.parse().map_err(|()| {
                    Error::invalid_request(format!("unknown condition '{}'", part.trim()))
                })?;
                conditions.push(condition);
            }
        }
        // Unknown sort values fall back to newest, matching the UI contract.
        let sort = self
            .sort
            .as_deref()
            .and_then(|raw| raw.parse::<SortOrder>().ok())
            .unwrap_or_default();

        Ok(ListingFilter {
            query: self.q.filter(|q| !q.trim().is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
            conditions,
            location: self.location.filter(|l| !l.trim().is_empty()),
            sort,
            ..ListingFilter::default()
        }
        .with_category(self.category))
    }
}

/// Outcome body for like toggles.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeBody {
    pub liked: bool,
    pub likes: u64,
}

impl From<LikeOutcome> for LikeBody {
    fn from(outcome: LikeOutcome) -> Self {
        Self {
            liked: outcome.liked,
            likes: outcome.likes,
        }
    }
}

fn to_bodies(listings: &[Listing]) -> Vec<ListingBody> {
    listings.iter().map(ListingBody::from).collect()
}

/// Browse approved, visible listings with filters and sorting.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    params(ListingQueryParams),
    responses(
        (status = 200, description = "Visible listings", body = [ListingBody]),
        (status = 400, description = "Invalid filter")
    ),
    tags = ["listings"],
    operation_id = "browseListings"
)]
#[get("/listings")]
pub async fn browse(
    state: web::Data<HttpState>,
    query: web::Query<ListingQueryParams>,
) -> ApiResult<web::Json<Vec<ListingBody>>> {
    let filter = query.into_inner().into_filter()?;
    let listings = state
        .listings
        .search(&filter, chrono::Utc::now())
        .await?;
    Ok(web::Json(to_bodies(&listings)))
}

/// The calling seller's own listings, any status.
#[utoipa::path(
    get,
    path = "/api/v1/listings/mine",
    responses(
        (status = 200, description = "Own listings", body = [ListingBody]),
        (status = 401, description = "Not logged in")
    ),
    tags = ["listings"],
    operation_id = "myListings"
)]
#[get("/listings/mine")]
pub async fn mine(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListingBody>>> {
    let caller = state.caller(&session).await?;
    let listings = state.listings.my_listings(&caller).await?;
    Ok(web::Json(to_bodies(&listings)))
}

/// Fetch one listing; records a view deduplicated per viewer identity.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing", body = ListingBody),
        (status = 404, description = "Unknown listing")
    ),
    tags = ["listings"],
    operation_id = "getListing"
)]
#[get("/listings/{id}")]
pub async fn get_one(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ListingBody>> {
    let id = ListingId::from(path.into_inner());
    let viewer = match session.user_id()? {
        Some(user_id) => ViewerIdentity::User(user_id),
        None => ViewerIdentity::Anonymous(
            req.peer_addr()
                .map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string()),
        ),
    };
    let listing = state.listings.get(&viewer, id).await?;
    Ok(web::Json(ListingBody::from(&listing)))
}

/// Create a listing; it enters the moderation queue as pending.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    request_body = ListingRequestBody,
    responses(
        (status = 201, description = "Pending listing created", body = ListingBody),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not an approved seller")
    ),
    tags = ["listings"],
    operation_id = "createListing"
)]
#[post("/listings")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ListingRequestBody>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let draft = payload.into_inner().into_draft()?;
    let listing = state
        .listings
        .create(&caller, draft, chrono::Utc::now())
        .await?;
    Ok(HttpResponse::Created().json(ListingBody::from(&listing)))
}

/// Edit an owned listing; the edit sends it back through moderation.
#[utoipa::path(
    put,
    path = "/api/v1/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body = ListingRequestBody,
    responses(
        (status = 200, description = "Updated listing, pending review", body = ListingBody),
        (status = 403, description = "Not the listing's seller"),
        (status = 404, description = "Unknown listing")
    ),
    tags = ["listings"],
    operation_id = "editListing"
)]
#[put("/listings/{id}")]
pub async fn edit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ListingRequestBody>,
) -> ApiResult<web::Json<ListingBody>> {
    let caller = state.caller(&session).await?;
    let id = ListingId::from(path.into_inner());
    let draft = payload.into_inner().into_draft()?;
    let listing = state
        .listings
        .edit(&caller, id, draft, chrono::Utc::now())
        .await?;
    Ok(web::Json(ListingBody::from(&listing)))
}

/// Delete an owned listing.
#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the listing's seller"),
        (status = 404, description = "Unknown listing")
    ),
    tags = ["listings"],
    operation_id = "deleteListing"
)]
#[delete("/listings/{id}")]
pub async fn remove(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id = ListingId::from(path.into_inner());
    state.listings.delete(&caller, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mark an owned listing as sold. Irreversible; a second call conflicts.
#[utoipa::path(
    patch,
    path = "/api/v1/listings/{id}/sold",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing sold", body = ListingBody),
        (status = 403, description = "Not the listing's seller"),
        (status = 409, description = "Already sold")
    ),
    tags = ["listings"],
    operation_id = "markListingSold"
)]
#[patch("/listings/{id}/sold")]
pub async fn mark_sold(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ListingBody>> {
    let caller = state.caller(&session).await?;
    let id = ListingId::from(path.into_inner());
    let listing = state
        .listings
        .mark_sold(&caller, id, chrono::Utc::now())
        .await?;
    Ok(web::Json(ListingBody::from(&listing)))
}

/// Toggle a like on a listing.
#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/like",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeBody),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Unknown listing")
    ),
    tags = ["listings"],
    operation_id = "toggleLike"
)]
#[post("/listings/{id}/like")]
pub async fn toggle_like(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<LikeBody>> {
    let caller = state.caller(&session).await?;
    let id = ListingId::from(path.into_inner());
    let outcome = state.listings.toggle_like(&caller, id).await?;
    Ok(web::Json(LikeBody::from(outcome)))
}
