//! Application-level configuration.
//!
//! - [`PipelineParams`]: paging, batching, resolution and stop criteria
//! - [`RetryPolicy`]: bounded retry with exponential backoff for oracle calls

pub mod pipeline_params;

pub use pipeline_params::{PipelineParams, RetryPolicy};
