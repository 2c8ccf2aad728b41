//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod answer_oracle;
pub mod message_cache;
pub mod message_source;
pub mod progress;
