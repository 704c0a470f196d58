//! Listing aggregate and the moderation state machine.
//!
//! Two orthogonal axes: moderation (`PENDING -> {APPROVED, REJECTED}`,
//! single shot per submission) and availability (`UNSOLD -> SOLD`, one way).
//! View and like tracking are deduplicated sets whose counters always equal
//! the set size.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;
use super::validation::sanitize_text;
use super::Error;

/// Maximum number of image references per listing.
pub const MAX_LISTING_IMAGES: usize = 5;

/// Stable listing identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ListingId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Moderation state controlling marketplace visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    /// Wire representation used in response bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin review decision for a pending listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for ListingStatus {
    fn from(value: ReviewDecision) -> Self {
        match value {
            ReviewDecision::Approved => Self::Approved,
            ReviewDecision::Rejected => Self::Rejected,
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(()),
        }
    }
}

/// Physical condition of the item, a closed set enforced server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    New,
    #[serde(rename = "Like New")]
    LikeNew,
    Excellent,
    Good,
    Fair,
}

impl Condition {
    /// Wire representation used in bodies and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::LikeNew => "Like New",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "New" => Ok(Self::New),
            "Like New" => Ok(Self::LikeNew),
            "Excellent" => Ok(Self::Excellent),
            "Good" => Ok(Self::Good),
            "Fair" => Ok(Self::Fair),
            _ => Err(()),
        }
    }
}

/// Price in the smallest currency unit, strictly positive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Validate and construct a price.
    pub fn try_new(raw: i64) -> Result<Self, ListingValidationError> {
        if raw <= 0 {
            return Err(ListingValidationError::NonPositivePrice { raw });
        }
        Ok(Self(raw))
    }

    /// Amount in the smallest currency unit.
    pub fn amount(self) -> i64 {
        self.0
    }
}

/// Point-in-time copy of the seller's identity, captured at creation.
///
/// Deliberately not a live reference: later renames or re-verification of
/// the account do not rewrite who the buyer dealt with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSnapshot {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub verified: bool,
}

/// Identity used to deduplicate views.
///
/// Anonymous viewers fall back to their network address; weak, but
/// acceptable deduplication for this domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerIdentity {
    User(UserId),
    Anonymous(String),
}

impl ViewerIdentity {
    /// Key stored in the `viewed_by` set.
    pub fn key(&self) -> String {
        match self {
            Self::User(id) => id.to_string(),
            Self::Anonymous(addr) => format!("anon:{addr}"),
        }
    }
}

/// Validation failures raised when creating or editing a listing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingValidationError {
    #[error("listing title must not be empty")]
    EmptyTitle,
    #[error("listing price must be positive, got {raw}")]
    NonPositivePrice { raw: i64 },
    #[error("listing category must not be empty")]
    EmptyCategory,
    #[error("listing requires at least one image")]
    NoImages,
    #[error("listing allows at most {MAX_LISTING_IMAGES} images, got {count}")]
    TooManyImages { count: usize },
}

/// Fields supplied by the seller when creating or editing a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    pub condition: Condition,
    pub location: Option<String>,
    pub images: Vec<String>,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes: u64,
}

/// Marketplace listing.
///
/// ## Invariants
/// - `seller` never changes after creation.
/// - `likes == liked_by.len()` and `views == viewed_by.len()`.
/// - `sold_at` is set exactly when `is_sold` flips, and never again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub condition: Condition,
    pub location: Option<String>,
    pub images: Vec<String>,
    pub seller: SellerSnapshot,
    pub status: ListingStatus,
    pub admin_comments: Option<String>,
    pub is_sold: bool,
    pub sold_at: Option<DateTime<Utc>>,
    pub views: u64,
    pub viewed_by: BTreeSet<String>,
    pub likes: u64,
    pub liked_by: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_draft(draft: ListingDraft) -> Result<ValidatedDraft, ListingValidationError> {
    let title = sanitize_text(&draft.title);
    if title.is_empty() {
        return Err(ListingValidationError::EmptyTitle);
    }
    let price = Price::try_new(draft.price)?;
    let category = sanitize_text(&draft.category);
    if category.is_empty() {
        return Err(ListingValidationError::EmptyCategory);
    }
    if draft.images.is_empty() {
        return Err(ListingValidationError::NoImages);
    }
    if draft.images.len() > MAX_LISTING_IMAGES {
        return Err(ListingValidationError::TooManyImages {
            count: draft.images.len(),
        });
    }
    let location = draft
        .location
        .map(|raw| sanitize_text(&raw))
        .filter(|loc| !loc.is_empty());

    Ok(ValidatedDraft {
        title,
        description: sanitize_text(&draft.description),
        price,
        category,
        condition: draft.condition,
        location,
        images: draft.images,
    })
}

struct ValidatedDraft {
    title: String,
    description: String,
    price: Price,
    category: String,
    condition: Condition,
    location: Option<String>,
    images: Vec<String>,
}

impl Listing {
    /// Create a pending listing from a validated draft and seller snapshot.
    pub fn new(
        draft: ListingDraft,
        seller: SellerSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Self, ListingValidationError> {
        let draft = validate_draft(draft)?;
        Ok(Self {
            id: ListingId::random(),
            title: draft.title,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            condition: draft.condition,
            location: draft.location,
            images: draft.images,
            seller,
            status: ListingStatus::Pending,
            admin_comments: None,
            is_sold: false,
            sold_at: None,
            views: 0,
            viewed_by: BTreeSet::new(),
            likes: 0,
            liked_by: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the given user is the recorded seller.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.seller.id == user
    }

    /// Review a pending submission: `PENDING -> {APPROVED, REJECTED}`.
    ///
    /// Moderation is single shot: a listing that already left `PENDING`
    /// yields a conflict.
    pub fn review(
        &mut self,
        decision: ReviewDecision,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        if self.status != ListingStatus::Pending {
            return Err(Error::conflict(format!(
                "listing has already been {}",
                self.status
            )));
        }
        self.status = decision.into();
        if comments.is_some() {
            self.admin_comments = comments;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Replace the seller-editable fields and send the listing back through
    /// moderation. The seller snapshot is untouched.
    pub fn apply_edit(
        &mut self,
        draft: ListingDraft,
        now: DateTime<Utc>,
    ) -> Result<(), ListingValidationError> {
        let draft = validate_draft(draft)?;
        self.title = draft.title;
        self.description = draft.description;
        self.price = draft.price;
        self.category = draft.category;
        self.condition = draft.condition;
        self.location = draft.location;
        self.images = draft.images;
        // Edited content has not been reviewed; back to the queue.
        self.status = ListingStatus::Pending;
        self.admin_comments = None;
        self.updated_at = now;
        Ok(())
    }

    /// Mark the listing sold: `UNSOLD -> SOLD`, irreversible.
    pub fn mark_sold(&mut self, now: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
        if self.is_sold {
            return Err(Error::conflict("listing is already sold"));
        }
        self.is_sold = true;
        self.sold_at = Some(now);
        self.updated_at = now;
        Ok(now)
    }

    /// Record a view, at most once per distinct viewer identity.
    /// Returns whether this call counted.
    pub fn record_view(&mut self, viewer: &ViewerIdentity) -> bool {
        if self.viewed_by.insert(viewer.key()) {
            self.views += 1;
            true
        } else {
            false
        }
    }

    /// Toggle a like for the given user. The counter always equals the set
    /// size.
    pub fn toggle_like(&mut self, user: UserId) -> LikeOutcome {
        let liked = if self.liked_by.remove(&user) {
            false
        } else {
            self.liked_by.insert(user);
            true
        };
        self.likes = self.liked_by.len() as u64;
        LikeOutcome {
            liked,
            likes: self.likes,
        }
    }
}

#[cfg(test)]
#[path = "listing_tests.rs"]
mod tests;
