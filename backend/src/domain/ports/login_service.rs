//! Port for credential verification.
//!
//! Signup and OTP delivery live outside this service; the core only needs
//! "does this email/password pair map to a user id".

use async_trait::async_trait;

use crate::domain::user::UserId;

/// Errors raised by credential adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// The credential backend could not be reached.
    #[error("credential store unavailable: {message}")]
    Unavailable { message: String },
}

impl LoginError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Port verifying a credential pair against the credential store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify the pair; `None` means bad credentials, not an error.
    async fn verify(&self, email: &str, password: &str) -> Result<Option<UserId>, LoginError>;
}

/// Fixture implementation that rejects every credential pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn verify(&self, _email: &str, _password: &str) -> Result<Option<UserId>, LoginError> {
        Ok(None)
    }
}
