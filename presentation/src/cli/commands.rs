//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every section, including the frame log
    Full,
    /// Phase, risk level and verdict only
    Summary,
    /// The session snapshot as JSON
    Json,
}

impl From<OutputFormat> for triage_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => Self::Full,
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for triage-stream
#[derive(Parser, Debug)]
#[command(name = "triage-stream")]
#[command(author, version, about = "Streaming client for the multi-stage triage pipeline")]
#[command(long_about = r#"
triage-stream submits a patient case to the triage pipeline and follows the
server-sent event stream as the run moves through its phases:

  init -> classification -> specialist_council -> cmo_synthesis -> complete

The reconstructed session (risk prediction, specialist opinions, CMO verdict
and the full frame log) is printed when the stream ends.

Configuration files are loaded from (in priority order):
1. TRIAGE_* environment variables (e.g. TRIAGE_SERVER__BASE_URL)
2. --config <path>     Explicit config file
3. ./triage.toml       Project-level config
4. ~/.config/triage-stream/config.toml   Global config

Example:
  triage-stream run --case patient.json
  triage-stream --output json run --case patient.json --session-id case-42
  triage-stream replay captures/run.sse --case patient.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (defaults to the config file, then `summary`)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Pipeline base URL (overrides config)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Fail the run after this many seconds without a frame; 0 disables
    #[arg(long, value_name = "SECS")]
    pub idle_timeout: Option<u64>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a case and follow its live event stream
    Run {
        #[command(flatten)]
        case: CaseArgs,

        /// User id sent with the run
        #[arg(long, default_value = "cli_user")]
        user_id: String,
    },

    /// Replay a captured event stream as if it were live
    Replay {
        /// Capture file holding a raw text/event-stream body
        #[arg(value_name = "CAPTURE")]
        capture: PathBuf,

        #[command(flatten)]
        case: CaseArgs,

        /// Read the capture in chunks of this many bytes (overrides config)
        #[arg(long, value_name = "BYTES")]
        chunk_bytes: Option<usize>,
    },
}

#[derive(clap::Args, Debug)]
pub struct CaseArgs {
    /// JSON file with the patient case
    #[arg(long, value_name = "PATH")]
    pub case: PathBuf,

    /// Session id (defaults to one derived from the current time)
    #[arg(long, value_name = "ID")]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_command() {
        let cli = Cli::try_parse_from([
            "triage-stream",
            "-vv",
            "--output",
            "json",
            "run",
            "--case",
            "patient.json",
            "--session-id",
            "case-42",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        match cli.command {
            Some(Command::Run { case, user_id }) => {
                assert_eq!(case.case, PathBuf::from("patient.json"));
                assert_eq!(case.session_id.as_deref(), Some("case-42"));
                assert_eq!(user_id, "cli_user");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_replay_command() {
        let cli = Cli::try_parse_from([
            "triage-stream",
            "--idle-timeout",
            "30",
            "replay",
            "run.sse",
            "--case",
            "patient.json",
            "--chunk-bytes",
            "16",
        ])
        .unwrap();

        assert_eq!(cli.idle_timeout, Some(30));
        assert!(matches!(
            cli.command,
            Some(Command::Replay { chunk_bytes: Some(16), .. })
        ));
    }

    #[test]
    fn run_requires_a_case() {
        assert!(Cli::try_parse_from(["triage-stream", "run"]).is_err());
    }

    #[test]
    fn output_format_maps_to_domain() {
        assert_eq!(
            triage_domain::OutputFormat::from(OutputFormat::Summary),
            triage_domain::OutputFormat::Summary
        );
    }
}
