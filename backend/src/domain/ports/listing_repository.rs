//! Port abstraction for listing persistence adapters.
//!
//! Besides plain document reads and writes, the port exposes the conditional
//! single-document mutations the moderation state machine needs: mark-sold,
//! view dedup, like toggles, and single-shot review. Adapters must check the
//! precondition at write time, under whatever lock or transaction gives them
//! per-document atomicity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::listing::{
    LikeOutcome, Listing, ListingId, ListingStatus, ReviewDecision, ViewerIdentity,
};
use crate::domain::marketplace::ListingFilter;
use crate::domain::user::UserId;

/// Persistence errors raised by listing repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingRepositoryError {
    /// The store could not be reached or is in a bad state.
    #[error("listing store unavailable: {message}")]
    Unavailable { message: String },
    /// A query or write failed during execution.
    #[error("listing store query failed: {message}")]
    Query { message: String },
}

impl ListingRepositoryError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Result of a conditional mark-sold write.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkSoldOutcome {
    /// This call flipped the listing to sold.
    Sold(Listing),
    /// The listing was already sold; `sold_at` is untouched.
    AlreadySold,
}

/// Result of a conditional review write.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// This call settled the review.
    Reviewed(Listing),
    /// The listing had already left `pending`; its current status.
    AlreadyReviewed(ListingStatus),
}

/// Port for reading and writing listing documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert a new listing.
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError>;

    /// Fetch a listing by identifier.
    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Replace an existing listing document. Returns false when missing.
    async fn save(&self, listing: &Listing) -> Result<bool, ListingRepositoryError>;

    /// Hard delete. Returns false when the listing was already gone.
    async fn delete(&self, id: ListingId) -> Result<bool, ListingRepositoryError>;

    /// Marketplace query: visible listings matching the filter, sorted.
    async fn search(
        &self,
        filter: &ListingFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Listing>, ListingRepositoryError>;

    /// All listings owned by a seller, newest first.
    async fn list_by_seller(&self, seller: UserId)
        -> Result<Vec<Listing>, ListingRepositoryError>;

    /// The admin review queue, newest first.
    async fn list_pending(&self) -> Result<Vec<Listing>, ListingRepositoryError>;

    /// Number of listings in a given moderation state.
    async fn count_by_status(&self, status: ListingStatus)
        -> Result<u64, ListingRepositoryError>;

    /// Conditionally mark a listing sold; the `is_sold` precondition is
    /// checked at write time. `None` when the listing does not exist.
    async fn mark_sold(
        &self,
        id: ListingId,
        at: DateTime<Utc>,
    ) -> Result<Option<MarkSoldOutcome>, ListingRepositoryError>;

    /// Record a view, deduplicated per viewer identity, and return the
    /// updated listing. `None` when the listing does not exist.
    async fn record_view(
        &self,
        id: ListingId,
        viewer: &ViewerIdentity,
    ) -> Result<Option<Listing>, ListingRepositoryError>;

    /// Atomically toggle a like. `None` when the listing does not exist.
    async fn toggle_like(
        &self,
        id: ListingId,
        user: UserId,
    ) -> Result<Option<LikeOutcome>, ListingRepositoryError>;

    /// Single-shot review: applies the decision only if the listing is still
    /// pending. `None` when the listing does not exist.
    async fn review(
        &self,
        id: ListingId,
        decision: ReviewDecision,
        comments: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<ReviewOutcome>, ListingRepositoryError>;
}
