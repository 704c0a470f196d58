//! Seller onboarding service.
//!
//! Drives the role and application state machine over the user repository:
//! apply, approve, reject, moderate, onboarding, and the admin review queue.
//! Every entry point consults the authorization gate before touching state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::authorization::{can_perform, Action, Caller};
use super::ports::{UserRepository, UserRepositoryError};
use super::user::{ApplicationStatus, Role, User, UserId};
use super::Error;

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    Error::internal(error.to_string())
}

/// Moderation action an admin can take against a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    /// Fully reset the target's selling capability.
    Ban,
    /// Record the action without touching state.
    Warn,
}

/// Service implementing the seller-application lifecycle.
#[derive(Clone)]
pub struct SellerOnboardingService {
    users: Arc<dyn UserRepository>,
}

impl SellerOnboardingService {
    /// Create the service over a user repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    async fn load(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn persist(&self, user: &User) -> Result<(), Error> {
        let saved = self.users.save(user).await.map_err(map_user_repo_error)?;
        if saved {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {} not found", user.id)))
        }
    }

    /// Submit a seller application for the calling user.
    pub async fn apply(
        &self,
        caller: &Caller,
        reason: &str,
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<ApplicationStatus, Error> {
        can_perform(caller, &Action::ApplyForSeller).require()?;
        let actor = caller.require_actor()?;

        let mut user = self.load(actor.id).await?;
        user.apply_for_seller(reason, category, now)?;
        self.persist(&user).await?;

        info!(user = %user.id, category = ?user.application.category, "seller application submitted");
        Ok(user.application.status)
    }

    /// Complete the one-time role-selection flow for the calling user.
    pub async fn complete_onboarding(
        &self,
        caller: &Caller,
        chosen: Role,
    ) -> Result<User, Error> {
        can_perform(caller, &Action::CompleteOnboarding).require()?;
        let actor = caller.require_actor()?;

        let mut user = self.load(actor.id).await?;
        user.complete_onboarding(chosen)?;
        self.persist(&user).await?;
        Ok(user)
    }

    /// Approve a pending application. Status, review timestamp, role, and
    /// the approved flag are written together in one document save.
    pub async fn approve(
        &self,
        caller: &Caller,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<User, Error> {
        can_perform(caller, &Action::ReviewSellerApplication).require()?;

        let mut user = self.load(user_id).await?;
        user.approve_application(now)?;
        self.persist(&user).await?;

        info!(user = %user.id, "seller application approved");
        Ok(user)
    }

    /// Reject a pending application, optionally recording a note.
    pub async fn reject(
        &self,
        caller: &Caller,
        user_id: UserId,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<User, Error> {
        can_perform(caller, &Action::ReviewSellerApplication).require()?;

        let mut user = self.load(user_id).await?;
        user.reject_application(note, now)?;
        self.persist(&user).await?;

        info!(user = %user.id, "seller application rejected");
        Ok(user)
    }

    /// Moderate a user. `Ban` idempotently resets selling capability;
    /// `Warn` is recorded in the log only. Listings are never touched here.
    pub async fn moderate(
        &self,
        caller: &Caller,
        user_id: UserId,
        action: ModerationAction,
        reason: Option<&str>,
    ) -> Result<User, Error> {
        can_perform(caller, &Action::ModerateUser).require()?;
        let admin = caller.require_actor()?;

        let mut user = self.load(user_id).await?;
        info!(
            admin = %admin.id,
            target = %user.id,
            ?action,
            reason = reason.unwrap_or("n/a"),
            "admin moderation action"
        );
        if action == ModerationAction::Ban {
            user.reset_selling();
            self.persist(&user).await?;
        }
        Ok(user)
    }

    /// Admin review queue: users with a pending application, newest first.
    pub async fn pending_applications(&self, caller: &Caller) -> Result<Vec<User>, Error> {
        can_perform(caller, &Action::ViewAdminDashboard).require()?;
        self.users
            .list_pending_applications()
            .await
            .map_err(map_user_repo_error)
    }
}

#[cfg(test)]
#[path = "sellers_tests.rs"]
mod tests;
