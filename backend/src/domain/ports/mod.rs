//! Domain ports for the hexagonal boundary.

mod listing_repository;
mod login_service;
mod user_repository;

#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{
    ListingRepository, ListingRepositoryError, MarkSoldOutcome, ReviewOutcome,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginError, LoginService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
