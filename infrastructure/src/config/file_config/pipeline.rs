//! Retrieval pipeline configuration (`[pipeline]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePipelineConfig {
    /// Candidates per validator call (1..=20).
    pub max_validator_messages: usize,
    /// Member names offered to the resolver (1..=200).
    pub max_resolver_names: usize,
    /// Confidence at which paging stops early (0.0..=1.0).
    pub confidence_threshold: f64,
    /// Page budget per question; 0 = unbounded.
    pub max_pages: usize,
}

impl Default for FilePipelineConfig {
    fn default() -> Self {
        Self {
            max_validator_messages: 12,
            max_resolver_names: 50,
            confidence_threshold: 0.75,
            max_pages: 0,
        }
    }
}
