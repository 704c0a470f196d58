//! In-memory credential store.
//!
//! Keeps SHA-256 digests of passwords keyed by lowercased email. Signup
//! lives outside the core, so credentials enter through [`register`]
//! (bootstrap seeding and tests).
//!
//! [`register`]: MemoryLoginService::register

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::ports::{LoginError, LoginService};
use crate::domain::user::UserId;

#[derive(Debug, Clone)]
struct Credential {
    user_id: UserId,
    digest: String,
}

fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Mutex-guarded credential map.
#[derive(Debug, Default)]
pub struct MemoryLoginService {
    inner: Mutex<HashMap<String, Credential>>,
}

impl MemoryLoginService {
    /// Create an empty credential store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the credential pair for a user.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        user_id: UserId,
    ) -> Result<(), LoginError> {
        let credential = Credential {
            user_id,
            digest: digest(password),
        };
        let mut store = self
            .inner
            .lock()
            .map_err(|_| LoginError::unavailable("credential store mutex poisoned"))?;
        store.insert(email.to_lowercase(), credential);
        Ok(())
    }
}

#[async_trait]
impl LoginService for MemoryLoginService {
    async fn verify(&self, email: &str, password: &str) -> Result<Option<UserId>, LoginError> {
        let store = self
            .inner
            .lock()
            .map_err(|_| LoginError::unavailable("credential store mutex poisoned"))?;
        Ok(store
            .get(&email.to_lowercase())
            .filter(|credential| credential.digest == digest(password))
            .map(|credential| credential.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_registered_credentials() {
        let service = MemoryLoginService::new();
        let id = UserId::random();
        service
            .register("Amara@Campus.edu", "hunter2hunter2", id)
            .expect("store reachable");

        let hit = service
            .verify("amara@campus.edu", "hunter2hunter2")
            .await
            .expect("store reachable");
        assert_eq!(hit, Some(id));

        let miss = service
            .verify("amara@campus.edu", "wrong")
            .await
            .expect("store reachable");
        assert_eq!(miss, None);
    }
}
