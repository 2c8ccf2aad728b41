//! Core domain concepts shared across all subdomains.
//!
//! - [`question::Question`]: a validated question about the member messages
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod question;
