//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: identifier newtypes for every entity
//! - [`error::DomainError`]: domain-level errors
//! - [`validation`]: configuration issues reported without failing hard

pub mod error;
pub mod ids;
pub mod validation;
