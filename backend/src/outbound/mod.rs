//! Outbound adapters: persistence and credential storage behind the domain
//! ports.

pub mod persistence;
