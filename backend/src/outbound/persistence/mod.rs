//! Persistence adapters implementing the domain ports.

mod memory_listing_repository;
mod memory_login_service;
mod memory_user_repository;

pub use memory_listing_repository::MemoryListingRepository;
pub use memory_login_service::MemoryLoginService;
pub use memory_user_repository::MemoryUserRepository;
