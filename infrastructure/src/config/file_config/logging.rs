//! Log destinations (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for per-run JSONL audit trails; unset disables auditing
    pub audit_dir: Option<PathBuf>,
    /// Directory for the daily-rolling diagnostic log; unset logs to stderr only
    pub log_dir: Option<PathBuf>,
}
