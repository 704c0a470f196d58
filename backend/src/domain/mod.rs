//! Domain layer: aggregates, state machines, the authorization gate, and the
//! services driving them over ports.
//!
//! Types here are transport agnostic. Inbound adapters map them to HTTP;
//! outbound adapters persist them behind the traits in [`ports`].

pub mod authorization;
pub mod error;
pub mod listing;
pub mod listings;
pub mod marketplace;
pub mod ports;
pub mod sellers;
pub mod user;
pub mod validation;

pub use self::error::{Error, ErrorCode};

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
