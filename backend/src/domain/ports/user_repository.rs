//! Port abstraction for user persistence adapters.

use async_trait::async_trait;

use crate::domain::user::{User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// The store could not be reached or is in a bad state.
    #[error("user store unavailable: {message}")]
    Unavailable { message: String },
    /// A query or write failed during execution.
    #[error("user store query failed: {message}")]
    Query { message: String },
}

impl UserRepositoryError {
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

/// Port for reading and writing user documents.
///
/// `save` replaces the whole document in one write, which is what keeps the
/// multi-field approval transition atomic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails on a duplicate email.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by (lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Replace an existing user document. Returns false when it is missing.
    async fn save(&self, user: &User) -> Result<bool, UserRepositoryError>;

    /// Users with a pending seller application, newest application first.
    async fn list_pending_applications(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Total number of users.
    async fn count(&self) -> Result<u64, UserRepositoryError>;

    /// Number of users with a pending seller application.
    async fn count_pending_applications(&self) -> Result<u64, UserRepositoryError>;
}
