//! In-memory user store.
//!
//! Each call takes the store mutex once and applies the whole change inside
//! it, giving the same per-document atomicity a document store provides.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{ApplicationStatus, User, UserId};

/// Mutex-guarded map of user documents keyed by id.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    inner: Mutex<HashMap<UserId, User>>,
}

impl MemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, User>>, UserRepositoryError> {
        self.inner
            .lock()
            .map_err(|_| UserRepositoryError::unavailable("user store mutex poisoned"))
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut store = self.lock()?;
        if store.values().any(|existing| existing.email == user.email) {
            return Err(UserRepositoryError::query(format!(
                "email {} already registered",
                user.email
            )));
        }
        store.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let email = email.to_lowercase();
        Ok(self
            .lock()?
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn save(&self, user: &User) -> Result<bool, UserRepositoryError> {
        let mut store = self.lock()?;
        if store.contains_key(&user.id) {
            store.insert(user.id, user.clone());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list_pending_applications(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut pending: Vec<User> = self
            .lock()?
            .values()
            .filter(|user| user.application.status == ApplicationStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.application.applied_at.cmp(&a.application.applied_at));
        Ok(pending)
    }

    async fn count(&self) -> Result<u64, UserRepositoryError> {
        Ok(self.lock()?.len() as u64)
    }

    async fn count_pending_applications(&self) -> Result<u64, UserRepositoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|user| user.application.status == ApplicationStatus::Pending)
            .count() as u64)
    }
}
