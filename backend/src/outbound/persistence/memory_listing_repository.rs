//! In-memory listing store.
//!
//! The conditional mutations (mark-sold, view dedup, like toggle, review)
//! run entirely under one mutex acquisition by calling the aggregate's
//! transition methods in place, so preconditions are checked at write time.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::listing::{
    LikeOutcome, Listing, ListingId, ListingStatus, ReviewDecision, ViewerIdentity,
};
use crate::domain::marketplace::{visible_in_marketplace, ListingFilter};
use crate::domain::ports::{
    ListingRepository, ListingRepositoryError, MarkSoldOutcome, ReviewOutcome,
};
use crate::domain::user::UserId;

/// Mutex-guarded map of listing documents keyed by id.
#[derive(Debug, Default)]
pub struct MemoryListingRepository {
    inner: Mutex<HashMap<ListingId, Listing>>,
}

impl MemoryListingRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ListingId, Listing>>, ListingRepositoryError> {
        self.inner
            .lock()
            .map_err(|_| ListingRepositoryError::unavailable("listing store mutex poisoned"))
    }
}

#[async_trait]
impl ListingRepository for MemoryListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        self.lock()?.insert(listing.id, listing.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ListingId,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn save(&self, listing: &Listing) -> Result<bool, ListingRepositoryError> {
        let mut store = self.lock()?;
        if store.contains_key(&listing.id) {
            store.insert(listing.id, listing.clone());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete(&self, id: ListingId) -> Result<bool, ListingRepositoryError> {
        Ok(self.lock()?.remove(&id).is_some())
    }

    async fn search(
        &self,
        filter: &ListingFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut matches: Vec<Listing> = self
            .lock()?
            .values()
            .filter(|listing| visible_in_marketplace(listing, now) && filter.matches(listing))
            .cloned()
            .collect();
        filter.sort(&mut matches);
        Ok(matches)
    }

    async fn list_by_seller(
        &self,
        seller: UserId,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut owned: Vec<Listing> = self
            .lock()?
            .values()
            .filter(|listing| listing.is_owned_by(seller))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn list_pending(&self) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut pending: Vec<Listing> = self
            .lock()?
            .values()
            .filter(|listing| listing.status == ListingStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn count_by_status(
        &self,
        status: ListingStatus,
    ) -> Result<u64, ListingRepositoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|listing| listing.status == status)
            .count() as u64)
    }

    async fn mark_sold(
        &self,
        id: ListingId,
        at: DateTime<Utc>,
    ) -> Result<Option<MarkSoldOutcome>, ListingRepositoryError> {
        let mut store = self.lock()?;
        let Some(listing) = store.get_mut(&id) else {
            return Ok(None);
        };
        if listing.is_sold {
            return Ok(Some(MarkSoldOutcome::AlreadySold));
        }
        listing
            .mark_sold(at)
            .map_err(|err| ListingRepositoryError::query(err.to_string()))?;
        Ok(Some(MarkSoldOutcome::Sold(listing.clone())))
    }

    async fn record_view(
        &self,
        id: ListingId,
        viewer: &ViewerIdentity,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut store = self.lock()?;
        let Some(listing) = store.get_mut(&id) else {
            return Ok(None);
        };
        listing.record_view(viewer);
        Ok(Some(listing.clone()))
    }

    async fn toggle_like(
        &self,
        id: ListingId,
        user: UserId,
    ) -> Result<Option<LikeOutcome>, ListingRepositoryError> {
        let mut store = self.lock()?;
        let Some(listing) = store.get_mut(&id) else {
            return Ok(None);
        };
        Ok(Some(listing.toggle_like(user)))
    }

    async fn review(
        &self,
        id: ListingId,
        decision: ReviewDecision,
        comments: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<ReviewOutcome>, ListingRepositoryError> {
        let mut store = self.lock()?;
        let Some(listing) = store.get_mut(&id) else {
            return Ok(None);
        };
        if listing.status != ListingStatus::Pending {
            return Ok(Some(ReviewOutcome::AlreadyReviewed(listing.status)));
        }
        listing
            .review(decision, comments, at)
            .map_err(|err| ListingRepositoryError::query(err.to_string()))?;
        Ok(Some(ReviewOutcome::Reviewed(listing.clone())))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::listing::{Condition, ListingDraft, SellerSnapshot};
    use crate::domain::marketplace::{SortOrder, SOLD_VISIBILITY_DAYS};

    fn listing(title: &str, price: i64) -> Listing {
        let draft = ListingDraft {
            title: title.into(),
            description: String::new(),
            price,
            category: "Books".into(),
            condition: Condition::Good,
            location: None,
            images: vec!["img.jpg".into()],
        };
        let seller = SellerSnapshot {
            id: UserId::random(),
            name: "Sam".into(),
            email: "sam@campus.edu".into(),
            verified: true,
        };
        Listing::new(draft, seller, Utc::now()).expect("valid draft")
    }

    fn approved(title: &str, price: i64) -> Listing {
        let mut l = listing(title, price);
        l.review(ReviewDecision::Approved, None, Utc::now())
            .expect("review succeeds");
        l
    }

    #[tokio::test]
    async fn search_hides_pending_and_aged_sold_listings() {
        let repo = MemoryListingRepository::new();
        let now = Utc::now();

        let visible = approved("visible", 100);
        let pending = listing("pending", 100);
        let mut recently_sold = approved("recently sold", 100);
        recently_sold.mark_sold(now).expect("sale succeeds");
        let mut long_sold = approved("long sold", 100);
        long_sold
            .mark_sold(now - Duration::days(SOLD_VISIBILITY_DAYS + 1))
            .expect("sale succeeds");

        for l in [&visible, &pending, &recently_sold, &long_sold] {
            repo.insert(l).await.expect("insert succeeds");
        }

        let results = repo
            .search(&ListingFilter::default(), now)
            .await
            .expect("search succeeds");
        let titles: Vec<&str> = results.iter().map(|l| l.title.as_str()).collect();
        assert!(titles.contains(&"visible"));
        assert!(titles.contains(&"recently sold"));
        assert!(!titles.contains(&"pending"));
        assert!(!titles.contains(&"long sold"));
    }

    #[tokio::test]
    async fn search_sorts_by_price_ascending() {
        let repo = MemoryListingRepository::new();
        for (title, price) in [("mid", 200), ("cheap", 100), ("dear", 300)] {
            repo.insert(&approved(title, price)).await.expect("insert succeeds");
        }

        let filter = ListingFilter {
            sort: SortOrder::PriceAsc,
            ..ListingFilter::default()
        };
        let results = repo.search(&filter, Utc::now()).await.expect("search succeeds");
        let titles: Vec<&str> = results.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["cheap", "mid", "dear"]);
    }

    #[tokio::test]
    async fn concurrent_mark_sold_has_exactly_one_winner() {
        let repo = Arc::new(MemoryListingRepository::new());
        let item = approved("lamp", 800);
        let id = item.id;
        repo.insert(&item).await.expect("insert succeeds");

        let first_at = Utc::now();
        let second_at = first_at + Duration::seconds(1);
        let (a, b) = tokio::join!(repo.mark_sold(id, first_at), repo.mark_sold(id, second_at));

        let outcomes = [
            a.expect("first call succeeds").expect("listing exists"),
            b.expect("second call succeeds").expect("listing exists"),
        ];
        let wins = outcomes
            .iter()
            .filter(|o| matches!(o, MarkSoldOutcome::Sold(_)))
            .count();
        assert_eq!(wins, 1);

        let stored = repo
            .find_by_id(id)
            .await
            .expect("lookup succeeds")
            .expect("listing exists");
        assert!(stored.is_sold);
        // The losing call never overwrote the winner's timestamp.
        assert_eq!(stored.sold_at, Some(first_at));
    }

    #[tokio::test]
    async fn review_is_single_shot_at_the_store() {
        let repo = MemoryListingRepository::new();
        let item = listing("lamp", 800);
        let id = item.id;
        repo.insert(&item).await.expect("insert succeeds");

        let first = repo
            .review(id, ReviewDecision::Approved, None, Utc::now())
            .await
            .expect("review succeeds")
            .expect("listing exists");
        assert!(matches!(first, ReviewOutcome::Reviewed(_)));

        let second = repo
            .review(id, ReviewDecision::Rejected, None, Utc::now())
            .await
            .expect("review succeeds")
            .expect("listing exists");
        assert_eq!(
            second,
            ReviewOutcome::AlreadyReviewed(ListingStatus::Approved)
        );
    }

    #[tokio::test]
    async fn record_view_and_toggle_like_mutate_the_stored_document() {
        let repo = MemoryListingRepository::new();
        let item = approved("lamp", 800);
        let id = item.id;
        repo.insert(&item).await.expect("insert succeeds");

        let viewer = ViewerIdentity::Anonymous("10.0.0.1".into());
        repo.record_view(id, &viewer).await.expect("view succeeds");
        repo.record_view(id, &viewer).await.expect("view succeeds");

        let user = UserId::random();
        let liked = repo
            .toggle_like(id, user)
            .await
            .expect("toggle succeeds")
            .expect("listing exists");
        assert_eq!(liked, LikeOutcome { liked: true, likes: 1 });

        let stored = repo
            .find_by_id(id)
            .await
            .expect("lookup succeeds")
            .expect("listing exists");
        assert_eq!(stored.views, 1);
        assert_eq!(stored.likes, 1);
    }

    #[tokio::test]
    async fn missing_listing_yields_none_not_error() {
        let repo = MemoryListingRepository::new();
        let id = ListingId::random();
        assert_eq!(repo.mark_sold(id, Utc::now()).await.expect("call succeeds"), None);
        assert_eq!(
            repo.toggle_like(id, UserId::random()).await.expect("call succeeds"),
            None
        );
        assert!(!repo.delete(id).await.expect("call succeeds"));
    }

    #[tokio::test]
    async fn mark_sold_wins_are_mutually_exclusive_under_contention() {
        let repo = Arc::new(MemoryListingRepository::new());
        let item = approved("contended", 100);
        let id = item.id;
        repo.insert(&item).await.expect("insert succeeds");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.mark_sold(id, Utc::now()).await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            let outcome = handle
                .await
                .expect("task completes")
                .expect("call succeeds")
                .expect("listing exists");
            if matches!(outcome, MarkSoldOutcome::Sold(_)) {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn concurrent_views_from_one_identity_count_once() {
        let repo = Arc::new(MemoryListingRepository::new());
        let item = approved("lamp", 800);
        let id = item.id;
        repo.insert(&item).await.expect("insert succeeds");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let viewer = ViewerIdentity::Anonymous("10.0.0.1".into());
                repo.record_view(id, &viewer).await
            }));
        }
        for handle in handles {
            handle
                .await
                .expect("task completes")
                .expect("call succeeds")
                .expect("listing exists");
        }

        let stored = repo
            .find_by_id(id)
            .await
            .expect("lookup succeeds")
            .expect("listing exists");
        assert_eq!(stored.views, 1);
        assert_eq!(stored.viewed_by.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_likes_from_distinct_users_all_land() {
        let repo = Arc::new(MemoryListingRepository::new());
        let item = approved("lamp", 800);
        let id = item.id;
        repo.insert(&item).await.expect("insert succeeds");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.toggle_like(id, UserId::random()).await
            }));
        }
        for handle in handles {
            let outcome = handle
                .await
                .expect("task completes")
                .expect("call succeeds")
                .expect("listing exists");
            assert!(outcome.liked);
        }

        let stored = repo
            .find_by_id(id)
            .await
            .expect("lookup succeeds")
            .expect("listing exists");
        assert_eq!(stored.likes, 8);
        assert_eq!(stored.liked_by.len(), 8);
    }
}
