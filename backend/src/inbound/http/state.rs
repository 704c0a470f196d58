//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! domain services and ports and stay testable without real I/O.

use std::sync::Arc;

use crate::domain::authorization::{Actor, Caller};
use crate::domain::listings::ListingService;
use crate::domain::ports::{ListingRepository, LoginService, UserRepository};
use crate::domain::sellers::SellerOnboardingService;
use crate::domain::user::User;
use crate::domain::Error;

use super::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub login: Arc<dyn LoginService>,
    pub sellers: SellerOnboardingService,
    pub listings: ListingService,
}

impl HttpState {
    /// Wire the services over the given adapters.
    pub fn new(
        users: Arc<dyn UserRepository>,
        listings: Arc<dyn ListingRepository>,
        login: Arc<dyn LoginService>,
    ) -> Self {
        Self {
            sellers: SellerOnboardingService::new(Arc::clone(&users)),
            listings: ListingService::new(listings, Arc::clone(&users)),
            users,
            login,
        }
    }

    /// Resolve the session to a caller by re-reading the user record, so
    /// role changes take effect on the next request. A stale session whose
    /// user no longer exists degrades to anonymous.
    pub async fn caller(&self, session: &SessionContext) -> Result<Caller, Error> {
        let Some(user_id) = session.user_id()? else {
            return Ok(Caller::Anonymous);
        };
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        Ok(user
            .as_ref()
            .map(Actor::from_user)
            .map_or(Caller::Anonymous, Caller::User))
    }

    /// Resolve the session to the full user record, requiring authentication.
    pub async fn current_user(&self, session: &SessionContext) -> Result<User, Error> {
        let Some(user_id) = session.user_id()? else {
            return Err(Error::unauthorized("login required"));
        };
        self.users
            .find_by_id(user_id)
            .await
            .map_err(|error| Error::internal(error.to_string()))?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}
