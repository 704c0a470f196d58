//! Listing service.
//!
//! Drives the moderation state machine and the marketplace query surface
//! over the listing and user repositories. Mutations pass through the
//! authorization gate with the loaded target, so ownership checks always run
//! against fresh state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::authorization::{can_perform, Action, Caller};
use super::listing::{
    LikeOutcome, Listing, ListingDraft, ListingId, ListingStatus, ReviewDecision,
    SellerSnapshot, ViewerIdentity,
};
use super::marketplace::{ListingFilter, MarketplaceStats};
#[cfg(test)]
use super::user::UserId;

use super::ports::{
    ListingRepository, ListingRepositoryError, MarkSoldOutcome, ReviewOutcome, UserRepository,
    UserRepositoryError,
};
use super::Error;

fn map_listing_repo_error(error: ListingRepositoryError) -> Error {
    Error::internal(error.to_string())
}

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    Error::internal(error.to_string())
}

/// Outcome of a wishlist toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistOutcome {
    pub favourited: bool,
    pub wishlist: Vec<ListingId>,
}

/// Service implementing listing lifecycle and marketplace queries.
#[derive(Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingRepository>,
    users: Arc<dyn UserRepository>,
}

impl ListingService {
    /// Create the service over the listing and user repositories.
    pub fn new(listings: Arc<dyn ListingRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { listings, users }
    }

    async fn load(&self, id: ListingId) -> Result<Listing, Error> {
        self.listings
            .find_by_id(id)
            .await
            .map_err(map_listing_repo_error)?
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))
    }

    /// Create a listing. The seller snapshot is captured from the caller's
    /// current user record; the listing starts pending review.
    pub async fn create(
        &self,
        caller: &Caller,
        draft: ListingDraft,
        now: DateTime<Utc>,
    ) -> Result<Listing, Error> {
        can_perform(caller, &Action::CreateListing).require()?;
        let actor = caller.require_actor()?;

        let seller = self
            .users
            .find_by_id(actor.id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", actor.id)))?;
        let snapshot = SellerSnapshot {
            id: seller.id,
            name: seller.name.clone(),
            email: seller.email.clone(),
            verified: seller.verified_student,
        };

        let listing = Listing::new(draft, snapshot, now)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.listings
            .insert(&listing)
            .await
            .map_err(map_listing_repo_error)?;

        info!(listing = %listing.id, seller = %listing.seller.id, "listing submitted for review");
        Ok(listing)
    }

    /// Fetch a single listing and record the view, deduplicated per viewer.
    pub async fn get(&self, viewer: &ViewerIdentity, id: ListingId) -> Result<Listing, Error> {
        self.listings
            .record_view(id, viewer)
            .await
            .map_err(map_listing_repo_error)?
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))
    }

    /// Marketplace query over approved, visible listings.
    pub async fn search(
        &self,
        filter: &ListingFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Listing>, Error> {
        self.listings
            .search(filter, now)
            .await
            .map_err(map_listing_repo_error)
    }

    /// All listings owned by the calling seller, newest first.
    pub async fn my_listings(&self, caller: &Caller) -> Result<Vec<Listing>, Error> {
        let actor = caller.require_actor()?;
        self.listings
            .list_by_seller(actor.id)
            .await
            .map_err(map_listing_repo_error)
    }

    /// Edit a listing. Content changes send it back through moderation; the
    /// seller snapshot is never touched.
    pub async fn edit(
        &self,
        caller: &Caller,
        id: ListingId,
        draft: ListingDraft,
        now: DateTime<Utc>,
    ) -> Result<Listing, Error> {
        let mut listing = self.load(id).await?;
        can_perform(caller, &Action::EditListing(&listing)).require()?;

        listing
            .apply_edit(draft, now)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let saved = self
            .listings
            .save(&listing)
            .await
            .map_err(map_listing_repo_error)?;
        if !saved {
            return Err(Error::not_found(format!("listing {id} not found")));
        }
        Ok(listing)
    }

    /// Hard delete a listing.
    pub async fn delete(&self, caller: &Caller, id: ListingId) -> Result<(), Error> {
        let listing = self.load(id).await?;
        can_perform(caller, &Action::DeleteListing(&listing)).require()?;

        let deleted = self
            .listings
            .delete(id)
            .await
            .map_err(map_listing_repo_error)?;
        if !deleted {
            return Err(Error::not_found(format!("listing {id} not found")));
        }
        info!(listing = %id, "listing deleted");
        Ok(())
    }

    /// Mark a listing sold. The unsold precondition is re-checked at write
    /// time, so a concurrent second call gets a conflict and cannot
    /// overwrite `sold_at`.
    pub async fn mark_sold(
        &self,
        caller: &Caller,
        id: ListingId,
        now: DateTime<Utc>,
    ) -> Result<Listing, Error> {
        let listing = self.load(id).await?;
        can_perform(caller, &Action::MarkListingSold(&listing)).require()?;

        match self
            .listings
            .mark_sold(id, now)
            .await
            .map_err(map_listing_repo_error)?
        {
            None => Err(Error::not_found(format!("listing {id} not found"))),
            Some(MarkSoldOutcome::AlreadySold) => {
                Err(Error::conflict("listing is already sold"))
            }
            Some(MarkSoldOutcome::Sold(updated)) => Ok(updated),
        }
    }

    /// Toggle a like for the calling user.
    pub async fn toggle_like(&self, caller: &Caller, id: ListingId) -> Result<LikeOutcome, Error> {
        can_perform(caller, &Action::LikeListing).require()?;
        let actor = caller.require_actor()?;

        self.listings
            .toggle_like(id, actor.id)
            .await
            .map_err(map_listing_repo_error)?
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))
    }

    /// Toggle a listing on the calling user's wishlist.
    pub async fn toggle_wishlist(
        &self,
        caller: &Caller,
        id: ListingId,
    ) -> Result<WishlistOutcome, Error> {
        can_perform(caller, &Action::ToggleWishlist).require()?;
        let actor = caller.require_actor()?;

        // The listing must exist when added; stale ids are dropped on read.
        self.load(id).await?;

        let mut user = self
            .users
            .find_by_id(actor.id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", actor.id)))?;
        let favourited = user.toggle_wishlist(id);
        self.users.save(&user).await.map_err(map_user_repo_error)?;

        Ok(WishlistOutcome {
            favourited,
            wishlist: user.wishlist.iter().copied().collect(),
        })
    }

    /// The calling user's wishlist, with deleted listings dropped.
    pub async fn wishlist(&self, caller: &Caller) -> Result<Vec<Listing>, Error> {
        let actor = caller.require_actor()?;
        let user = self
            .users
            .find_by_id(actor.id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", actor.id)))?;

        let mut listings = Vec::with_capacity(user.wishlist.len());
        for id in &user.wishlist {
            if let Some(listing) = self
                .listings
                .find_by_id(*id)
                .await
                .map_err(map_listing_repo_error)?
            {
                listings.push(listing);
            }
        }
        Ok(listings)
    }

    /// Admin review of a pending listing. Single shot: a listing that has
    /// already been reviewed yields a conflict.
    pub async fn review(
        &self,
        caller: &Caller,
        id: ListingId,
        decision: ReviewDecision,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Listing, Error> {
        can_perform(caller, &Action::ReviewListing).require()?;

        match self
            .listings
            .review(id, decision, comments, now)
            .await
            .map_err(map_listing_repo_error)?
        {
            None => Err(Error::not_found(format!("listing {id} not found"))),
            Some(ReviewOutcome::AlreadyReviewed(status)) => Err(Error::conflict(format!(
                "listing has already been {status}"
            ))),
            Some(ReviewOutcome::Reviewed(listing)) => {
                info!(listing = %listing.id, status = %listing.status, "listing reviewed");
                Ok(listing)
            }
        }
    }

    /// Admin review queue, newest first.
    pub async fn pending(&self, caller: &Caller) -> Result<Vec<Listing>, Error> {
        can_perform(caller, &Action::ViewAdminDashboard).require()?;
        self.listings
            .list_pending()
            .await
            .map_err(map_listing_repo_error)
    }

    /// Admin dashboard counters.
    pub async fn stats(&self, caller: &Caller) -> Result<MarketplaceStats, Error> {
        can_perform(caller, &Action::ViewAdminDashboard).require()?;
        Ok(MarketplaceStats {
            total_users: self.users.count().await.map_err(map_user_repo_error)?,
            pending_sellers: self
                .users
                .count_pending_applications()
                .await
                .map_err(map_user_repo_error)?,
            pending_listings: self
                .listings
                .count_by_status(ListingStatus::Pending)
                .await
                .map_err(map_listing_repo_error)?,
            approved_listings: self
                .listings
                .count_by_status(ListingStatus::Approved)
                .await
                .map_err(map_listing_repo_error)?,
        })
    }
}

#[cfg(test)]
#[path = "listings_tests.rs"]
mod tests;
