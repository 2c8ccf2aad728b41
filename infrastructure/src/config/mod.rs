//! Configuration file loading for member-qa
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `MEMBER_QA_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./member-qa.toml`
//! 4. Global: `~/.config/member-qa/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_SOURCE_URL, FileCacheConfig, FileConfig, FileLoggingConfig,
    FileOracleConfig, FileOutputConfig, FileOutputFormat, FilePipelineConfig, FileSourceConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
