//! User aggregate and the seller-application state machine.
//!
//! Selling capability moves through `NONE -> PENDING -> {APPROVED, REJECTED}`
//! with an out-of-band ban transition resetting everything back to `NONE`.
//! All transitions live on [`User`] so adapters persist whole documents and
//! never hand-edit individual fields.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::listing::ListingId;
use super::validation::sanitize_text;
use super::Error;

/// Minimum length of a seller-application reason, enforced server side.
pub const APPLICATION_REASON_MIN: usize = 20;

/// Stable user identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Baseline capability set of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Seller,
    Admin,
}

impl Role {
    /// Wire representation used in request and response bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a seller application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Wire representation used in response bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seller-application sub-record embedded in the user document.
///
/// `review_note` keeps the admin's rejection note separate from the
/// applicant's own `reason`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerApplication {
    pub reason: Option<String>,
    pub category: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
}

impl Default for SellerApplication {
    fn default() -> Self {
        Self {
            reason: None,
            category: None,
            status: ApplicationStatus::None,
            applied_at: None,
            reviewed_at: None,
            review_note: None,
        }
    }
}

/// Application user.
///
/// ## Invariants
/// - `application.status == Approved` if and only if `role == Seller` and
///   `is_approved_seller` is set. The approval and reset transitions are the
///   enforcement points.
/// - Mutate selling state only through the transition methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_approved_seller: bool,
    pub verified_student: bool,
    pub onboarding_completed: bool,
    pub application: SellerApplication,
    pub wishlist: BTreeSet<ListingId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh customer account.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: email.into().to_lowercase(),
            name: name.into(),
            role: Role::Customer,
            is_approved_seller: false,
            verified_student: false,
            onboarding_completed: false,
            application: SellerApplication::default(),
            wishlist: BTreeSet::new(),
            created_at: now,
        }
    }

    /// Submit a seller application: `NONE | REJECTED -> PENDING`.
    ///
    /// Approved sellers and users with an application already pending get a
    /// conflict. A rejected user may reapply. The role stays `customer`
    /// until an admin approves.
    pub fn apply_for_seller(
        &mut self,
        reason: &str,
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        if self.role == Role::Seller || self.is_approved_seller {
            return Err(Error::conflict("you are already an approved seller"));
        }
        if self.application.status == ApplicationStatus::Pending {
            return Err(Error::conflict(
                "a seller application is already pending review",
            ));
        }

        let reason = sanitize_text(reason);
        if reason.chars().count() < APPLICATION_REASON_MIN {
            return Err(Error::invalid_request(format!(
                "application reason must be at least {APPLICATION_REASON_MIN} characters"
            )));
        }
        let category = sanitize_text(category);
        if category.is_empty() {
            return Err(Error::invalid_request("application category is required"));
        }

        self.application = SellerApplication {
            reason: Some(reason),
            category: Some(category),
            status: ApplicationStatus::Pending,
            applied_at: Some(now),
            reviewed_at: None,
            review_note: None,
        };
        self.is_approved_seller = false;
        Ok(())
    }

    /// Approve a pending application: `PENDING -> APPROVED`.
    ///
    /// Status, review timestamp, role, and the approved flag change together;
    /// callers persist the whole document in one write.
    pub fn approve_application(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        if self.application.status != ApplicationStatus::Pending {
            return Err(Error::conflict("no seller application is pending review"));
        }
        self.application.status = ApplicationStatus::Approved;
        self.application.reviewed_at = Some(now);
        self.role = Role::Seller;
        self.is_approved_seller = true;
        Ok(())
    }

    /// Reject a pending application: `PENDING -> REJECTED`.
    pub fn reject_application(
        &mut self,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        if self.application.status != ApplicationStatus::Pending {
            return Err(Error::conflict("no seller application is pending review"));
        }
        self.application.status = ApplicationStatus::Rejected;
        self.application.reviewed_at = Some(now);
        self.application.review_note = note;
        self.is_approved_seller = false;
        Ok(())
    }

    /// Out-of-band demotion used by moderation. Idempotent full reset back
    /// to a fresh customer: role, approval flag, application, and onboarding
    /// all clear. Listings owned by the user are untouched.
    pub fn reset_selling(&mut self) {
        self.role = Role::Customer;
        self.is_approved_seller = false;
        self.application = SellerApplication::default();
        self.onboarding_completed = false;
    }

    /// Complete the one-time role-selection flow.
    ///
    /// Choosing `seller` only points the user at the application form; it
    /// grants nothing by itself. An approved seller choosing `customer` is
    /// refused: demotion goes through moderation, which clears the approval
    /// state as one unit.
    pub fn complete_onboarding(&mut self, chosen: Role) -> Result<(), Error> {
        if chosen == Role::Admin {
            return Err(Error::invalid_request(
                "onboarding role must be customer or seller",
            ));
        }
        if chosen == Role::Customer && self.is_approved_seller {
            return Err(Error::conflict(
                "approved sellers cannot drop to customer here",
            ));
        }
        self.onboarding_completed = true;
        if chosen == Role::Customer {
            self.role = Role::Customer;
        }
        Ok(())
    }

    /// Toggle a listing on the wishlist. Returns whether it is now present.
    pub fn toggle_wishlist(&mut self, listing: ListingId) -> bool {
        if self.wishlist.remove(&listing) {
            false
        } else {
            self.wishlist.insert(listing);
            true
        }
    }

    /// Whether the selling-capability invariant holds for this user.
    pub fn selling_invariant_holds(&self) -> bool {
        let approved = self.application.status == ApplicationStatus::Approved;
        approved == (self.role == Role::Seller && self.is_approved_seller)
            || self.role == Role::Admin
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
