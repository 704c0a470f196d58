//! Marketplace query surface: filters, sort orders, and the visibility rule.
//!
//! Only listings that passed moderation appear in marketplace queries, and
//! sold items drop out after a grace window so recent sales stay browsable.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::listing::{Condition, Listing, ListingStatus};

/// Days a sold listing stays visible in marketplace queries.
pub const SOLD_VISIBILITY_DAYS: i64 = 7;

/// Category value the UI sends to mean "no category filter".
pub const ALL_ITEMS_SENTINEL: &str = "All Items";

/// Sort order for marketplace queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Popular,
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "newest" => Ok(Self::Newest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "popular" => Ok(Self::Popular),
            _ => Err(()),
        }
    }
}

/// Filter over marketplace-visible listings.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Case-insensitive substring over title and description.
    pub query: Option<String>,
    /// Exact category match; [`ALL_ITEMS_SENTINEL`] is normalised to `None`.
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Empty means any condition.
    pub conditions: Vec<Condition>,
    /// Case-insensitive substring match.
    pub location: Option<String>,
    pub sort: SortOrder,
}

impl ListingFilter {
    /// Normalise the UI's "All Items" sentinel away.
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| c != ALL_ITEMS_SENTINEL && !c.is_empty());
        self
    }

    /// Whether a listing matches the filter fields (visibility excluded).
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(q) = &self.query {
            let q = q.to_lowercase();
            let hit = listing.title.to_lowercase().contains(&q)
                || listing.description.to_lowercase().contains(&q);
            if !hit {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &listing.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.price.amount() < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.price.amount() > max {
                return false;
            }
        }
        if !self.conditions.is_empty() && !self.conditions.contains(&listing.condition) {
            return false;
        }
        if let Some(location) = &self.location {
            let hit = listing
                .location
                .as_ref()
                .is_some_and(|loc| loc.to_lowercase().contains(&location.to_lowercase()));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Order a result set in place according to the requested sort.
    pub fn sort(&self, listings: &mut [Listing]) {
        match self.sort {
            SortOrder::Newest => {
                listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            SortOrder::PriceAsc => listings.sort_by_key(|l| l.price),
            SortOrder::PriceDesc => {
                listings.sort_by(|a, b| b.price.cmp(&a.price));
            }
            SortOrder::Popular => {
                listings.sort_by(|a, b| b.views.cmp(&a.views));
            }
        }
    }
}

/// Whether a listing is visible in the public marketplace at `now`:
/// approved, and either unsold or sold within the grace window.
pub fn visible_in_marketplace(listing: &Listing, now: DateTime<Utc>) -> bool {
    if listing.status != ListingStatus::Approved {
        return false;
    }
    if !listing.is_sold {
        return true;
    }
    listing
        .sold_at
        .is_some_and(|sold_at| sold_at >= now - Duration::days(SOLD_VISIBILITY_DAYS))
}

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceStats {
    pub total_users: u64,
    pub pending_sellers: u64,
    pub pending_listings: u64,
    pub approved_listings: u64,
}

#[cfg(test)]
#[path = "marketplace_tests.rs"]
mod tests;
