//! Infrastructure layer for member-qa
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod cache;
pub mod config;
pub mod oracle;
pub mod source;

// Re-export commonly used types
pub use cache::JsonFileMessageCache;
pub use config::{
    ConfigLoader, ConfigValidationError, FileCacheConfig, FileConfig, FileLoggingConfig,
    FileOracleConfig, FileOutputConfig, FileOutputFormat, FilePipelineConfig, FileSourceConfig,
};
pub use oracle::OpenAiOracle;
pub use source::HttpMessageSource;
