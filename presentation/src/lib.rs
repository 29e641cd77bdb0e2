//! Presentation layer for triage-stream
//!
//! This crate contains CLI definitions, the console formatter for session
//! snapshots, and progress observers.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{CaseArgs, Cli, Command, OutputFormat};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
