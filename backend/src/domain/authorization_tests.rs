//! Tests for the authorization gate.

use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::listing::{
    Condition, Listing, ListingDraft, SellerSnapshot,
};
use crate::domain::ErrorCode;

fn actor(role: Role, is_approved_seller: bool) -> Actor {
    Actor {
        id: UserId::random(),
        role,
        is_approved_seller,
    }
}

fn customer() -> Caller {
    Caller::User(actor(Role::Customer, false))
}

fn seller() -> Caller {
    Caller::User(actor(Role::Seller, true))
}

fn admin() -> Caller {
    Caller::User(actor(Role::Admin, false))
}

fn listing_owned_by(seller_id: UserId) -> Listing {
    let draft = ListingDraft {
        title: "Desk lamp".into(),
        description: String::new(),
        price: 800,
        category: "Dorm Essentials".into(),
        condition: Condition::Good,
        location: None,
        images: vec!["lamp.jpg".into()],
    };
    let snapshot = SellerSnapshot {
        id: seller_id,
        name: "Sam".into(),
        email: "sam@campus.edu".into(),
        verified: false,
    };
    Listing::new(draft, snapshot, Utc::now()).expect("valid draft")
}

#[test]
fn anonymous_may_browse() {
    assert_eq!(
        can_perform(&Caller::Anonymous, &Action::BrowseListings),
        Decision::Allow
    );
}

#[rstest]
#[case(Action::CreateListing)]
#[case(Action::LikeListing)]
#[case(Action::ToggleWishlist)]
#[case(Action::ApplyForSeller)]
#[case(Action::CompleteOnboarding)]
#[case(Action::ReviewListing)]
#[case(Action::ViewAdminDashboard)]
fn anonymous_is_denied_everything_else(#[case] action: Action<'_>) {
    assert_eq!(
        can_perform(&Caller::Anonymous, &action),
        Decision::Deny(DenyReason::Unauthenticated)
    );
}

#[rstest]
#[case(Action::BrowseListings)]
#[case(Action::LikeListing)]
#[case(Action::ToggleWishlist)]
#[case(Action::ApplyForSeller)]
#[case(Action::CompleteOnboarding)]
fn any_authenticated_user_gets_member_actions(#[case] action: Action<'_>) {
    assert_eq!(can_perform(&customer(), &action), Decision::Allow);
    assert_eq!(can_perform(&seller(), &action), Decision::Allow);
}

#[test]
fn create_listing_requires_role_and_flag_together() {
    assert_eq!(can_perform(&seller(), &Action::CreateListing), Decision::Allow);
    assert_eq!(
        can_perform(&customer(), &Action::CreateListing),
        Decision::Deny(DenyReason::SellerApprovalRequired)
    );
    // Role without the flag is an inconsistent record; the gate denies it.
    assert_eq!(
        can_perform(
            &Caller::User(actor(Role::Seller, false)),
            &Action::CreateListing
        ),
        Decision::Deny(DenyReason::SellerApprovalRequired)
    );
    // Flag without the role is equally inconsistent.
    assert_eq!(
        can_perform(
            &Caller::User(actor(Role::Customer, true)),
            &Action::CreateListing
        ),
        Decision::Deny(DenyReason::SellerApprovalRequired)
    );
}

#[test]
fn owner_checks_apply_to_listing_mutations() {
    let owner = actor(Role::Seller, true);
    let listing = listing_owned_by(owner.id);

    assert_eq!(
        can_perform(&Caller::User(owner), &Action::EditListing(&listing)),
        Decision::Allow
    );
    assert_eq!(
        can_perform(&seller(), &Action::EditListing(&listing)),
        Decision::Deny(DenyReason::NotListingOwner)
    );
    assert_eq!(
        can_perform(&seller(), &Action::DeleteListing(&listing)),
        Decision::Deny(DenyReason::NotListingOwner)
    );
    assert_eq!(
        can_perform(&seller(), &Action::MarkListingSold(&listing)),
        Decision::Deny(DenyReason::NotListingOwner)
    );
}

#[test]
fn owning_customer_is_still_denied_listing_mutations() {
    // A seller demoted by a ban still owns their listings but loses the
    // capability; the seller check runs before the ownership check.
    let demoted = actor(Role::Customer, false);
    let listing = listing_owned_by(demoted.id);
    assert_eq!(
        can_perform(&Caller::User(demoted), &Action::MarkListingSold(&listing)),
        Decision::Deny(DenyReason::SellerApprovalRequired)
    );
}

#[rstest]
#[case(Action::ReviewListing)]
#[case(Action::ReviewSellerApplication)]
#[case(Action::ModerateUser)]
#[case(Action::ViewAdminDashboard)]
fn moderation_actions_require_admin(#[case] action: Action<'_>) {
    assert_eq!(can_perform(&admin(), &action), Decision::Allow);
    assert_eq!(
        can_perform(&customer(), &action),
        Decision::Deny(DenyReason::AdminRequired)
    );
    assert_eq!(
        can_perform(&seller(), &action),
        Decision::Deny(DenyReason::AdminRequired)
    );
}

#[test]
fn admin_bypasses_seller_and_ownership_checks() {
    let listing = listing_owned_by(UserId::random());
    assert_eq!(can_perform(&admin(), &Action::CreateListing), Decision::Allow);
    assert_eq!(
        can_perform(&admin(), &Action::EditListing(&listing)),
        Decision::Allow
    );
    assert_eq!(
        can_perform(&admin(), &Action::MarkListingSold(&listing)),
        Decision::Allow
    );
}

#[test]
fn require_maps_unauthenticated_to_401_and_others_to_403() {
    let unauthenticated = Decision::Deny(DenyReason::Unauthenticated)
        .require()
        .expect_err("denied");
    assert_eq!(unauthenticated.code(), ErrorCode::Unauthorized);

    let forbidden = Decision::Deny(DenyReason::AdminRequired)
        .require()
        .expect_err("denied");
    assert_eq!(forbidden.code(), ErrorCode::Forbidden);

    assert!(Decision::Allow.require().is_ok());
}

#[test]
fn require_actor_maps_anonymous_to_401() {
    let err = Caller::Anonymous.require_actor().expect_err("anonymous");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
