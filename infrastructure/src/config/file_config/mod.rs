//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod oracle;
mod output;
mod pipeline;
mod source;
mod storage;

pub use oracle::FileOracleConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use pipeline::FilePipelineConfig;
pub use source::{DEFAULT_SOURCE_URL, FileSourceConfig};
pub use storage::{FileCacheConfig, FileLoggingConfig};

use member_qa_application::{PipelineParams, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: String,
        max: String,
        value: String,
    },

    #[error("{0} cannot be 0")]
    Zero(&'static str),

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

fn check_range<T: PartialOrd + Display>(
    field: &'static str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ConfigValidationError> {
    if value < min || value > max {
        return Err(ConfigValidationError::OutOfRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_not_empty(field: &'static str, value: &str) -> Result<(), ConfigValidationError> {
    if value.trim().is_empty() {
        return Err(ConfigValidationError::Empty(field));
    }
    Ok(())
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Upstream message API
    pub source: FileSourceConfig,
    /// Language model used for resolution and validation
    pub oracle: FileOracleConfig,
    /// Retrieval loop knobs
    pub pipeline: FilePipelineConfig,
    /// Durable message cache
    pub cache: FileCacheConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        check_not_empty("source.base_url", &self.source.base_url)?;
        check_range("source.page_size", self.source.page_size, 1, 1000)?;
        if self.source.timeout_secs == 0 {
            return Err(ConfigValidationError::Zero("source.timeout_secs"));
        }
        if self.source.max_fetch_failures == 0 {
            return Err(ConfigValidationError::Zero("source.max_fetch_failures"));
        }

        check_not_empty("oracle.base_url", &self.oracle.base_url)?;
        check_not_empty("oracle.model", &self.oracle.model)?;
        if self.oracle.timeout_secs == 0 {
            return Err(ConfigValidationError::Zero("oracle.timeout_secs"));
        }
        check_range("oracle.temperature", self.oracle.temperature, 0.0, 2.0)?;

        check_range(
            "pipeline.max_validator_messages",
            self.pipeline.max_validator_messages,
            1,
            20,
        )?;
        check_range(
            "pipeline.max_resolver_names",
            self.pipeline.max_resolver_names,
            1,
            200,
        )?;
        check_range(
            "pipeline.confidence_threshold",
            self.pipeline.confidence_threshold,
            0.0,
            1.0,
        )?;

        if self.cache.enabled {
            check_not_empty("cache.path", &self.cache.path.to_string_lossy())?;
        }

        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Map the file representation onto the pipeline's parameters.
    pub fn pipeline_params(&self) -> PipelineParams {
        PipelineParams::default()
            .with_page_size(self.source.page_size)
            .with_min_fetch_interval(Duration::from_secs(self.source.min_fetch_interval_secs))
            .with_max_fetch_failures(self.source.max_fetch_failures)
            .with_max_validator_messages(self.pipeline.max_validator_messages)
            .with_max_resolver_names(self.pipeline.max_resolver_names)
            .with_confidence_threshold(self.pipeline.confidence_threshold)
            .with_max_pages(Some(self.pipeline.max_pages))
            .with_oracle_retry(RetryPolicy {
                max_retries: self.oracle.max_retries,
                base_backoff: Duration::from_millis(self.oracle.backoff_ms),
            })
    }
}
