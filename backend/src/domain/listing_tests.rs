//! Tests for the listing aggregate and its two state axes.

use chrono::{Duration, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;

fn snapshot() -> SellerSnapshot {
    SellerSnapshot {
        id: UserId::random(),
        name: "Sam".into(),
        email: "sam@campus.edu".into(),
        verified: true,
    }
}

fn draft() -> ListingDraft {
    ListingDraft {
        title: "Calculus textbook".into(),
        description: "Third edition, barely used.".into(),
        price: 2500,
        category: "Books".into(),
        condition: Condition::Good,
        location: Some("North campus".into()),
        images: vec!["img-1.jpg".into()],
    }
}

fn pending_listing() -> Listing {
    Listing::new(draft(), snapshot(), Utc::now()).expect("valid draft")
}

fn approved_listing() -> Listing {
    let mut listing = pending_listing();
    listing
        .review(ReviewDecision::Approved, None, Utc::now())
        .expect("review succeeds");
    listing
}

#[test]
fn new_listing_starts_pending_with_zeroed_counters() {
    let listing = pending_listing();
    assert_eq!(listing.status, ListingStatus::Pending);
    assert!(!listing.is_sold);
    assert!(listing.sold_at.is_none());
    assert_eq!(listing.views, 0);
    assert_eq!(listing.likes, 0);
    assert!(listing.admin_comments.is_none());
}

#[rstest]
#[case(0)]
#[case(-1)]
fn draft_rejects_non_positive_price(#[case] price: i64) {
    let mut d = draft();
    d.price = price;
    let err = Listing::new(d, snapshot(), Utc::now()).expect_err("invalid price");
    assert!(matches!(err, ListingValidationError::NonPositivePrice { .. }));
}

#[test]
fn draft_rejects_empty_title() {
    let mut d = draft();
    d.title = " \t ".into();
    let err = Listing::new(d, snapshot(), Utc::now()).expect_err("blank title");
    assert_eq!(err, ListingValidationError::EmptyTitle);
}

#[test]
fn draft_rejects_missing_images() {
    let mut d = draft();
    d.images.clear();
    let err = Listing::new(d, snapshot(), Utc::now()).expect_err("no images");
    assert_eq!(err, ListingValidationError::NoImages);
}

#[test]
fn draft_rejects_too_many_images() {
    let mut d = draft();
    d.images = (0..=MAX_LISTING_IMAGES).map(|i| format!("img-{i}.jpg")).collect();
    let err = Listing::new(d, snapshot(), Utc::now()).expect_err("image cap");
    assert_eq!(
        err,
        ListingValidationError::TooManyImages {
            count: MAX_LISTING_IMAGES + 1
        }
    );
}

#[rstest]
#[case(ReviewDecision::Approved, ListingStatus::Approved)]
#[case(ReviewDecision::Rejected, ListingStatus::Rejected)]
fn review_settles_pending_submission(
    #[case] decision: ReviewDecision,
    #[case] expected: ListingStatus,
) {
    let mut listing = pending_listing();
    listing
        .review(decision, Some("checked".into()), Utc::now())
        .expect("review succeeds");
    assert_eq!(listing.status, expected);
    assert_eq!(listing.admin_comments.as_deref(), Some("checked"));
}

#[test]
fn review_is_single_shot() {
    let mut listing = approved_listing();
    let err = listing
        .review(ReviewDecision::Rejected, None, Utc::now())
        .expect_err("second review conflicts");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(listing.status, ListingStatus::Approved);
}

#[test]
fn review_without_comments_keeps_existing_ones() {
    let mut listing = pending_listing();
    listing.admin_comments = Some("from a prior round".into());
    listing
        .review(ReviewDecision::Approved, None, Utc::now())
        .expect("review succeeds");
    assert_eq!(listing.admin_comments.as_deref(), Some("from a prior round"));
}

#[test]
fn edit_resets_moderation_and_clears_comments() {
    let mut listing = approved_listing();
    listing.admin_comments = Some("looks fine".into());
    let seller = listing.seller.clone();

    let mut d = draft();
    d.title = "Calculus textbook, price drop".into();
    listing.apply_edit(d, Utc::now()).expect("edit succeeds");

    assert_eq!(listing.status, ListingStatus::Pending);
    assert!(listing.admin_comments.is_none());
    assert_eq!(listing.title, "Calculus textbook, price drop");
    // The seller snapshot never changes after creation.
    assert_eq!(listing.seller, seller);
}

#[test]
fn edit_keeps_counters_and_sold_state() {
    let mut listing = approved_listing();
    listing.record_view(&ViewerIdentity::Anonymous("10.0.0.1".into()));
    listing.mark_sold(Utc::now()).expect("mark sold succeeds");

    listing.apply_edit(draft(), Utc::now()).expect("edit succeeds");
    assert_eq!(listing.views, 1);
    assert!(listing.is_sold);
}

#[test]
fn mark_sold_is_one_way() {
    let mut listing = approved_listing();
    let first = Utc::now();
    listing.mark_sold(first).expect("first sale succeeds");
    assert!(listing.is_sold);
    assert_eq!(listing.sold_at, Some(first));

    let err = listing
        .mark_sold(first + Duration::seconds(30))
        .expect_err("second sale conflicts");
    assert_eq!(err.code(), ErrorCode::Conflict);
    // The original timestamp survives the losing call.
    assert_eq!(listing.sold_at, Some(first));
}

#[test]
fn record_view_dedups_per_identity() {
    let mut listing = approved_listing();
    let user = ViewerIdentity::User(UserId::random());
    let anon = ViewerIdentity::Anonymous("10.0.0.1".into());

    assert!(listing.record_view(&user));
    assert!(!listing.record_view(&user));
    assert!(listing.record_view(&anon));
    assert!(!listing.record_view(&anon));

    assert_eq!(listing.views, 2);
    assert_eq!(listing.views, listing.viewed_by.len() as u64);
}

#[test]
fn anonymous_viewer_key_cannot_collide_with_user_key() {
    let anon = ViewerIdentity::Anonymous("10.0.0.1".into());
    assert!(anon.key().starts_with("anon:"));
}

#[test]
fn toggle_like_keeps_counter_equal_to_set_size() {
    let mut listing = approved_listing();
    let alice = UserId::random();
    let bob = UserId::random();

    assert_eq!(listing.toggle_like(alice), LikeOutcome { liked: true, likes: 1 });
    assert_eq!(listing.toggle_like(bob), LikeOutcome { liked: true, likes: 2 });
    assert_eq!(listing.toggle_like(alice), LikeOutcome { liked: false, likes: 1 });
    assert_eq!(listing.likes, listing.liked_by.len() as u64);
}

#[rstest]
#[case("New", Condition::New)]
#[case("Like New", Condition::LikeNew)]
#[case(" Excellent ", Condition::Excellent)]
fn condition_parses_wire_names(#[case] raw: &str, #[case] expected: Condition) {
    assert_eq!(raw.parse::<Condition>(), Ok(expected));
}

#[test]
fn condition_rejects_unknown_names() {
    assert!("Mint".parse::<Condition>().is_err());
    assert!("new".parse::<Condition>().is_err());
}
