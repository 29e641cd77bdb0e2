//! Configuration file loading for triage-stream
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables `TRIAGE_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./triage.toml` or `./.triage.toml`
//! 4. Global: `$XDG_CONFIG_HOME/triage-stream/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_BASE_URL, DEFAULT_STREAM_PATH, FileConfig, FileLoggingConfig,
    FileOutputConfig, FileServerConfig, FileStreamConfig,
};
pub use loader::ConfigLoader;
