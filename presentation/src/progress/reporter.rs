//! Progress reporting while a session's stream is consumed

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use triage_application::ports::session_observer::SessionObserver;
use triage_domain::{Anomaly, Phase, SessionId};

/// Pipeline phases a run passes through on success, for the step counter.
const STEPS: u64 = 5;

/// Reports progress with a spinner showing the current phase
pub struct ProgressReporter {
    bar: ProgressBar,
    opinions: AtomicUsize,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(STEPS);
        bar.set_style(Self::phase_style());
        bar.set_prefix(Phase::Idle.display_name());
        bar.set_message("Waiting for the pipeline...");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            bar,
            opinions: AtomicUsize::new(0),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:20.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn step(phase: Phase) -> u64 {
        phase.rank().map_or(0, u64::from).min(STEPS)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for ProgressReporter {
    fn on_phase_change(&self, _session_id: &SessionId, _from: Phase, to: Phase) {
        self.bar.set_prefix(to.display_name());
        self.bar.set_position(Self::step(to));
        self.bar.set_message("");
    }

    fn on_opinion(&self, _session_id: &SessionId, count: usize) {
        self.opinions.store(count, Ordering::Relaxed);
        self.bar
            .set_message(format!("{} specialist opinion(s)", count));
    }

    fn on_anomaly(&self, _session_id: &SessionId, anomaly: &Anomaly) {
        self.bar
            .println(format!("  {} {}", "!".yellow(), anomaly));
    }

    fn on_terminated(&self, _session_id: &SessionId, phase: Phase, error: Option<&str>) {
        match error {
            Some(detail) => self
                .bar
                .abandon_with_message(format!("{} {}", "failed:".red(), detail)),
            None => {
                self.bar.set_position(STEPS);
                self.bar.finish_with_message(format!(
                    "{} ({} opinions)",
                    phase.display_name().green(),
                    self.opinions.load(Ordering::Relaxed)
                ));
            }
        }
    }
}

/// Simple line-based progress (no fancy UI)
pub struct SimpleProgress;

impl SessionObserver for SimpleProgress {
    fn on_phase_change(&self, session_id: &SessionId, _from: Phase, to: Phase) {
        eprintln!("{} [{}] {}", "->".cyan(), session_id, to.display_name().bold());
    }

    fn on_opinion(&self, _session_id: &SessionId, count: usize) {
        eprintln!("  {} opinion #{}", "v".green(), count);
    }

    fn on_anomaly(&self, _session_id: &SessionId, anomaly: &Anomaly) {
        eprintln!("  {} {}", "!".yellow(), anomaly);
    }

    fn on_terminated(&self, session_id: &SessionId, phase: Phase, error: Option<&str>) {
        match error {
            Some(detail) => eprintln!("{} [{}] {}", "x".red(), session_id, detail),
            None => eprintln!("{} [{}] {}", "v".green(), session_id, phase.display_name()),
        }
    }
}
