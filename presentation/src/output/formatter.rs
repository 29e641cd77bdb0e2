//! Output formatter trait

use triage_domain::Session;

/// Trait for rendering a session snapshot
pub trait OutputFormatter {
    /// Every section, including the frame log
    fn format(&self, session: &Session) -> String;

    /// Format as JSON
    fn format_json(&self, session: &Session) -> String;

    /// Phase, risk level and verdict only
    fn format_summary(&self, session: &Session) -> String;
}
