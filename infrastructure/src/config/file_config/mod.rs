//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod logging;
mod output;
mod server;
mod stream;

pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use server::{DEFAULT_BASE_URL, DEFAULT_STREAM_PATH, FileServerConfig};
pub use stream::FileStreamConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A problem found in a loaded configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("server.base_url is empty")]
    EmptyBaseUrl,

    #[error("server.base_url '{0}' is not an http(s) URL")]
    InvalidBaseUrl(String),

    #[error("server.stream_path '{0}' must start with '/'")]
    InvalidStreamPath(String),

    #[error("stream.replay_chunk_bytes must be greater than zero")]
    ZeroReplayChunk,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Pipeline backend
    pub server: FileServerConfig,
    /// Stream consumption
    pub stream: FileStreamConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        let base_url = self.server.base_url.trim();
        if base_url.is_empty() {
            issues.push(ConfigValidationError::EmptyBaseUrl);
        } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            issues.push(ConfigValidationError::InvalidBaseUrl(base_url.to_string()));
        }

        if !self.server.stream_path.starts_with('/') {
            issues.push(ConfigValidationError::InvalidStreamPath(
                self.server.stream_path.clone(),
            ));
        }

        if self.stream.replay_chunk_bytes == 0 {
            issues.push(ConfigValidationError::ZeroReplayChunk);
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_domain::OutputFormat;

    #[test]
    fn deserialize_full_config() {
        let toml_str = r#"
[server]
base_url = "https://triage.example.org"
connect_timeout_secs = 3

[stream]
idle_timeout_secs = 300
replay_chunk_bytes = 17

[logging]
audit_dir = "/var/log/triage"

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "https://triage.example.org");
        assert_eq!(config.server.stream_path, DEFAULT_STREAM_PATH);
        assert_eq!(config.server.connect_timeout_secs, 3);
        assert_eq!(config.stream.idle_timeout_secs, Some(300));
        assert_eq!(config.stream.replay_chunk_bytes, 17);
        assert_eq!(
            config.logging.audit_dir.as_deref(),
            Some(std::path::Path::new("/var/log/triage"))
        );
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: FileConfig = toml::from_str("[stream]\nidle_timeout_secs = 60\n").unwrap();
        assert_eq!(config.server, FileServerConfig::default());
        assert!(config.logging.log_dir.is_none());
        assert!(config.output.color);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn validate_reports_every_issue() {
        let mut config = FileConfig::default();
        config.server.base_url = "ftp://nope".to_string();
        config.server.stream_path = "run/stream".to_string();
        config.stream.replay_chunk_bytes = 0;

        assert_eq!(
            config.validate(),
            vec![
                ConfigValidationError::InvalidBaseUrl("ftp://nope".to_string()),
                ConfigValidationError::InvalidStreamPath("run/stream".to_string()),
                ConfigValidationError::ZeroReplayChunk,
            ]
        );
    }

    #[test]
    fn empty_base_url_is_reported() {
        let mut config = FileConfig::default();
        config.server.base_url = "  ".to_string();
        assert_eq!(config.validate(), vec![ConfigValidationError::EmptyBaseUrl]);
    }
}
