//! Authorization gate.
//!
//! A pure decision function consulted before every mutating operation,
//! replacing the middleware-chain role checks of a conventional web stack.
//! Handlers resolve the caller once, services call [`can_perform`] with the
//! loaded target, and denials map to 401/403 at the HTTP edge.

use super::listing::Listing;
use super::user::{Role, User, UserId};
use super::Error;

/// Authenticated caller capabilities, derived from a fresh user-record read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
    pub is_approved_seller: bool,
}

impl Actor {
    /// Snapshot the gate-relevant fields of a user record.
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            is_approved_seller: user.is_approved_seller,
        }
    }
}

/// The caller of an operation: anonymous, or an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(Actor),
}

impl Caller {
    /// The authenticated actor, if any.
    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Anonymous => None,
            Self::User(actor) => Some(actor),
        }
    }

    /// The authenticated actor, or a 401-mapped error.
    pub fn require_actor(&self) -> Result<&Actor, Error> {
        self.actor()
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

/// Action being attempted, with the loaded target where ownership matters.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    BrowseListings,
    CreateListing,
    EditListing(&'a Listing),
    DeleteListing(&'a Listing),
    MarkListingSold(&'a Listing),
    LikeListing,
    ToggleWishlist,
    ApplyForSeller,
    CompleteOnboarding,
    ReviewListing,
    ReviewSellerApplication,
    ModerateUser,
    ViewAdminDashboard,
}

/// Reason a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    AdminRequired,
    SellerApprovalRequired,
    NotListingOwner,
}

impl DenyReason {
    /// Message surfaced to the client.
    pub fn message(self) -> &'static str {
        match self {
            Self::Unauthenticated => "login required",
            Self::AdminRequired => "admin privileges required",
            Self::SellerApprovalRequired => "approved seller status required",
            Self::NotListingOwner => "only the listing's seller may do this",
        }
    }
}

/// Gate verdict. Denials carry a reason; the gate itself never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    /// Convert the verdict into a result for `?`-style gating.
    /// `Unauthenticated` maps to 401, every other denial to 403.
    pub fn require(self) -> Result<(), Error> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(DenyReason::Unauthenticated) => {
                Err(Error::unauthorized(DenyReason::Unauthenticated.message()))
            }
            Self::Deny(reason) => Err(Error::forbidden(reason.message())),
        }
    }
}

fn seller_check(actor: &Actor) -> Decision {
    // A role=seller user without the approval flag is denied; the gate does
    // not assume the user-aggregate invariant holds.
    if actor.role == Role::Seller && actor.is_approved_seller {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::SellerApprovalRequired)
    }
}

fn owned_seller_check(actor: &Actor, listing: &Listing) -> Decision {
    match seller_check(actor) {
        Decision::Allow if listing.is_owned_by(actor.id) => Decision::Allow,
        Decision::Allow => Decision::Deny(DenyReason::NotListingOwner),
        deny => deny,
    }
}

/// Decide whether `caller` may perform `action`.
pub fn can_perform(caller: &Caller, action: &Action<'_>) -> Decision {
    let actor = match caller {
        Caller::Anonymous => {
            return match action {
                Action::BrowseListings => Decision::Allow,
                _ => Decision::Deny(DenyReason::Unauthenticated),
            };
        }
        Caller::User(actor) => actor,
    };

    // Admins bypass every gate, including seller approval for listings.
    if actor.role == Role::Admin {
        return Decision::Allow;
    }

    match action {
        Action::BrowseListings
        | Action::LikeListing
        | Action::ToggleWishlist
        | Action::ApplyForSeller
        | Action::CompleteOnboarding => Decision::Allow,
        Action::CreateListing => seller_check(actor),
        Action::EditListing(listing)
        | Action::DeleteListing(listing)
        | Action::MarkListingSold(listing) => owned_seller_check(actor, listing),
        Action::ReviewListing
        | Action::ReviewSellerApplication
        | Action::ModerateUser
        | Action::ViewAdminDashboard => Decision::Deny(DenyReason::AdminRequired),
    }
}

#[cfg(test)]
#[path = "authorization_tests.rs"]
mod tests;
