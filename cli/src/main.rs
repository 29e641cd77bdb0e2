//! triage-stream CLI entrypoint
//!
//! Wires the layers together: config files, logging, the HTTP or replay
//! gateway, and the console output.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
use triage_application::{
    NoObserver, RunRequest, RunTriageError, RunTriageUseCase, SessionObserver, StreamConfig,
    StreamSessionUseCase, TriageGateway,
};
use triage_domain::{CaseInput, OutputFormat as DomainOutputFormat, Phase, SessionId};
use triage_infrastructure::{
    ConfigLoader, FileConfig, FileReplayGateway, HttpTriageGateway, JsonlAuditLogger,
};
use triage_presentation::{
    CaseArgs, Cli, Command, ConsoleFormatter, OutputConfig, ProgressReporter, SimpleProgress,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = init_logging(cli.verbose, config.logging.log_dir.as_deref());

    if let Some(url) = cli.base_url.clone() {
        config.server.base_url = url;
    }

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            warn!("Config: {}", issue);
        }
        bail!("Invalid configuration ({} problem(s))", issues.len());
    }

    let Some(command) = cli.command else {
        bail!("No command given. Try `triage-stream run --case <PATH>` or see --help.");
    };

    let output = OutputConfig {
        format: cli
            .output
            .map(DomainOutputFormat::from)
            .or(config.output.format)
            .unwrap_or_default(),
        color: config.output.color && !cli.no_color,
        show_progress: !cli.quiet,
    };
    output.apply_color();

    let stream_config = match cli.idle_timeout {
        Some(secs) => StreamConfig::from_idle_timeout_seconds(Some(secs)),
        None => config.stream.to_stream_config(),
    };

    match command {
        Command::Run { case, user_id } => {
            let (session_id, input) = load_case(&case)?;
            let gateway = HttpTriageGateway::new(&config.server)?;
            info!("Streaming from {}", gateway.stream_url());
            let stream = stream_use_case(stream_config, &config, &session_id);
            let request = RunRequest::new(user_id, session_id, input);
            execute(gateway, request, stream, &output).await
        }
        Command::Replay {
            capture,
            case,
            chunk_bytes,
        } => {
            let (session_id, input) = load_case(&case)?;
            let chunk_bytes = chunk_bytes.unwrap_or(config.stream.replay_chunk_bytes);
            let gateway = FileReplayGateway::new(capture, chunk_bytes);
            info!("Replaying {}", gateway.path().display());
            let stream = stream_use_case(stream_config, &config, &session_id);
            let request = RunRequest::new("replay", session_id, input);
            execute(gateway, request, stream, &output).await
        }
    }
}

/// Console logging on stderr, plus a daily log file when `log_dir` is set.
///
/// The returned guard must live until exit so buffered file logs are flushed.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "triage-stream.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

fn load_case(args: &CaseArgs) -> Result<(SessionId, CaseInput)> {
    let raw = std::fs::read_to_string(&args.case)
        .with_context(|| format!("Failed to read case file {}", args.case.display()))?;
    let input: CaseInput = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid case file {}", args.case.display()))?;

    let session_id = match &args.session_id {
        Some(id) => SessionId::new(id.clone())?,
        None => SessionId::new(format!(
            "session-{}",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        ))?,
    };
    Ok((session_id, input))
}

fn stream_use_case(
    stream_config: StreamConfig,
    config: &FileConfig,
    session_id: &SessionId,
) -> StreamSessionUseCase {
    let stream = StreamSessionUseCase::new(stream_config);
    let Some(dir) = config.logging.audit_dir.as_ref() else {
        return stream;
    };
    match JsonlAuditLogger::for_session(dir, session_id) {
        Some(logger) => {
            info!("Audit log: {}", logger.path().display());
            stream.with_audit_logger(Arc::new(logger))
        }
        None => {
            warn!("Audit logging disabled: cannot write to {}", dir.display());
            stream
        }
    }
}

async fn execute<G: TriageGateway + 'static>(
    gateway: G,
    request: RunRequest,
    stream: StreamSessionUseCase,
    output: &OutputConfig,
) -> Result<()> {
    let observer: Arc<dyn SessionObserver> = if !output.show_progress {
        Arc::new(NoObserver)
    } else if output.format == DomainOutputFormat::Json {
        Arc::new(SimpleProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };

    let use_case = RunTriageUseCase::new(Arc::new(gateway))
        .with_stream(stream)
        .with_observer(observer);
    let session_id = request.session_id.clone();

    match use_case.start(request).await {
        Ok(subscription) => {
            tokio::select! {
                outcome = subscription.join() => {
                    info!(
                        "Stream for {} ended: {} ({} frames)",
                        outcome.session_id, outcome.end, outcome.frames
                    );
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, closing stream for {}", session_id);
                }
            }
        }
        Err(RunTriageError::Gateway(e)) => warn!("Backend unavailable: {}", e),
        Err(e) => return Err(e.into()),
    }

    let session = use_case
        .snapshot(&session_id)
        .ok_or_else(|| anyhow!("Session {} disappeared", session_id))?;
    println!("{}", ConsoleFormatter::render(&session, output.format));

    if session.phase() == Phase::Error {
        bail!(
            "Run {} failed: {}",
            session_id,
            session.error().unwrap_or("unknown error")
        );
    }
    Ok(())
}
