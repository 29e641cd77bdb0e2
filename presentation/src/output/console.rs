//! Console output formatter for triage sessions

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use triage_domain::{FlagSeverity, OutputFormat, Phase, Session};

/// Formats session snapshots for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render `session` in the requested format.
    pub fn render(session: &Session, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(session),
            OutputFormat::Summary => Self::format_summary(session),
            OutputFormat::Json => Self::format_json(session),
        }
    }

    /// Format the complete session
    pub fn format(session: &Session) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Triage Session"));
        output.push('\n');
        output.push_str(&Self::overview(session));

        // Case
        let input = session.input();
        output.push_str(&Self::section_header("Case"));
        output.push_str(&format!(
            "{} {}, {} y, {}\n",
            "Patient:".cyan().bold(),
            input.label(),
            input.age,
            input.gender
        ));
        output.push_str(&format!(
            "{} BP {}/{}  HR {}  Temp {}  SpO2 {}%\n",
            "Vitals:".cyan().bold(),
            input.bp_systolic,
            input.bp_diastolic,
            input.heart_rate,
            input.temperature,
            input.spo2
        ));
        if !input.symptoms.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Symptoms:".cyan().bold(),
                input.symptoms.join(", ")
            ));
        }
        if !input.conditions.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Conditions:".cyan().bold(),
                input.conditions.join(", ")
            ));
        }

        // Specialist council
        let opinions = session.specialist_opinions();
        if !session.opinions().is_empty() {
            output.push_str(&Self::section_header("Specialist Council"));
            for opinion in &opinions {
                output.push_str(&format!(
                    "\n{}\n",
                    format!(
                        "── {} (relevance {}, urgency {}) ──",
                        opinion.specialty, opinion.relevance_score, opinion.urgency_score
                    )
                    .yellow()
                    .bold()
                ));
                if !opinion.one_liner.is_empty() {
                    output.push_str(&format!("{}\n", opinion.one_liner));
                }
                for flag in &opinion.flags {
                    output.push_str(&format!(
                        "  {} {}\n",
                        Self::severity(flag.severity),
                        flag.label
                    ));
                }
            }
            let undecodable = session.opinions().len() - opinions.len();
            if undecodable > 0 {
                output.push_str(&format!(
                    "\n{}\n",
                    format!("{} opinion(s) could not be decoded; see the frame log", undecodable)
                        .dimmed()
                ));
            }
        }

        let others = session.other_specialties();
        if !others.is_empty() {
            output.push_str(&Self::section_header("Other Specialties"));
            for score in &others {
                output.push_str(&format!("  * {} ({})", score.department, score.relevance));
                if let Some(reason) = &score.reason {
                    output.push_str(&format!(": {}", reason));
                }
                output.push('\n');
            }
        }

        // Verdict
        if let Some(verdict) = session.cmo_verdict() {
            output.push_str(&Self::section_header("CMO Verdict"));
            output.push_str(&format!(
                "{} {}\n",
                "Final risk:".cyan().bold(),
                Self::risk(&verdict.final_risk_level)
            ));
            if let Some(priority) = verdict.priority() {
                output.push_str(&format!("{} {:.0}/100\n", "Priority:".cyan().bold(), priority));
            }
            if let Some(primary) = &verdict.primary_department {
                output.push_str(&format!("{} {}", "Department:".cyan().bold(), primary));
                if let Some(secondary) = &verdict.secondary_department {
                    output.push_str(&format!(" (then {})", secondary));
                }
                output.push('\n');
            }
            if !verdict.safety_alerts.is_empty() {
                output.push_str(&format!("\n{}\n", "Safety Alerts:".red().bold()));
                for alert in &verdict.safety_alerts {
                    let text = alert
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| alert.to_string());
                    output.push_str(&format!("  ! {}\n", text));
                }
            }
            if !verdict.consolidated_workup.is_empty() {
                output.push_str(&format!("\n{}\n", "Workup:".cyan().bold()));
                for item in &verdict.consolidated_workup {
                    output.push_str(&format!("  * {}", item.test));
                    if let Some(priority) = &item.priority {
                        output.push_str(&format!(" [{}]", priority));
                    }
                    if !item.ordered_by.is_empty() {
                        output.push_str(&format!(" ({})", item.ordered_by.join(", ")));
                    }
                    output.push('\n');
                }
            }
            if !verdict.explanation.is_empty() {
                output.push_str(&format!("\n{}\n", verdict.explanation));
            }
            if !verdict.key_factors.is_empty() {
                output.push_str(&format!("\n{}\n", "Key Factors:".cyan().bold()));
                for factor in &verdict.key_factors {
                    output.push_str(&format!("  * {}\n", factor));
                }
            }
        }

        // Frame log
        output.push_str(&Self::section_header("Frame Log"));
        for (index, entry) in session.log().iter().enumerate() {
            let frame = &entry.frame;
            let mut line = format!(
                "{:>3}  {}  {}",
                index + 1,
                frame.received_at().format("%H:%M:%S%.3f"),
                frame.event_type()
            );
            if frame.is_synthetic() {
                line.push_str(" (synthetic)");
            }
            if frame.payload().is_raw() {
                line.push_str(" [raw payload]");
            }
            output.push_str(&line);
            if let Some(anomaly) = &entry.anomaly {
                output.push_str(&format!("  {}", anomaly.to_string().yellow()));
            }
            output.push('\n');
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(session: &Session) -> String {
        serde_json::to_string_pretty(session).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the outcome only (concise output)
    pub fn format_summary(session: &Session) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n\n", "=== Triage Result ===".cyan().bold()));
        output.push_str(&Self::overview(session));

        if let Some(verdict) = session.cmo_verdict() {
            output.push_str(&format!(
                "{} {}",
                "Verdict:".bold(),
                Self::risk(&verdict.final_risk_level)
            ));
            if let Some(department) = &verdict.primary_department {
                output.push_str(&format!(" -> {}", department));
            }
            output.push('\n');
        }

        output
    }

    fn overview(session: &Session) -> String {
        let mut output = format!(
            "{} {}\n{} {}\n",
            "Session:".cyan().bold(),
            session.id(),
            "Phase:".cyan().bold(),
            Self::phase(session.phase())
        );

        if let Some(error) = session.error() {
            output.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
        }

        if let Some(prediction) = session.risk_prediction() {
            output.push_str(&format!(
                "{} {}",
                "Risk:".cyan().bold(),
                Self::risk(&prediction.risk_level)
            ));
            if let Some(confidence) = prediction.confidence_percent() {
                output.push_str(&format!(" ({:.1}% confidence)", confidence));
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "{} {}\n",
            "Opinions:".cyan().bold(),
            session.opinions().len()
        ));

        let anomalies = session.anomalies().count();
        if anomalies > 0 {
            output.push_str(&format!(
                "{} {}\n",
                "Anomalies:".yellow().bold(),
                anomalies
            ));
        }

        output
    }

    fn phase(phase: Phase) -> ColoredString {
        match phase {
            Phase::Complete => phase.display_name().green().bold(),
            Phase::Error => phase.display_name().red().bold(),
            _ => phase.display_name().yellow(),
        }
    }

    fn risk(level: &str) -> ColoredString {
        match level.to_ascii_lowercase().as_str() {
            "critical" | "high" => level.red().bold(),
            "medium" => level.yellow().bold(),
            _ => level.green(),
        }
    }

    fn severity(severity: FlagSeverity) -> ColoredString {
        match severity {
            FlagSeverity::RedFlag => "RED".red().bold(),
            FlagSeverity::YellowFlag => "YELLOW".yellow().bold(),
            FlagSeverity::Info => "INFO".blue(),
            FlagSeverity::Other => "NOTE".dimmed(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, session: &Session) -> String {
        Self::format(session)
    }

    fn format_json(&self, session: &Session) -> String {
        Self::format_json(session)
    }

    fn format_summary(&self, session: &Session) -> String {
        Self::format_summary(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use triage_domain::{CaseInput, EventType, Frame, Payload, SessionId};

    fn case() -> CaseInput {
        serde_json::from_value(json!({
            "patient_id": "PT-TEST-002", "name": "Ravi Kumar", "age": 55, "gender": "Male",
            "symptoms": ["chest_pain", "sweating"], "bp_systolic": 160, "bp_diastolic": 100,
            "heart_rate": 105, "temperature": 98.6, "spo2": 96, "conditions": ["hypertension"]
        }))
        .unwrap()
    }

    fn frame(event: &str, payload: serde_json::Value) -> Frame {
        Frame::new(EventType::from_wire(event), Payload::Json(payload))
    }

    fn finished_session() -> Session {
        let mut session = Session::new(SessionId::new("debug_session").unwrap(), case());
        session.apply(frame("status", json!({"phase": "init"})));
        session.apply(frame(
            "classification_result",
            json!({"risk_level": "High", "confidence": 71.3}),
        ));
        session.apply(frame(
            "specialist_opinion",
            json!({"specialty": "Cardiology", "relevance_score": 9, "urgency_score": 10,
                   "one_liner": "Rule out STEMI",
                   "flags": [{"severity": "RED_FLAG", "label": "Chest pain with diaphoresis"}]}),
        ));
        session.apply(Frame::new(
            EventType::SpecialistOpinion,
            Payload::Raw("{broken".into()),
        ));
        session.apply(frame(
            "cmo_verdict",
            json!({"final_risk_level": "Critical", "priority_score": 98,
                   "primary_department": "Cardiology",
                   "consolidated_workup": [{"test": "ECG", "priority": "STAT", "ordered_by": ["Cardiology"]}]}),
        ));
        session.apply(frame("complete", json!({})));
        session
    }

    #[test]
    fn full_format_lists_every_section() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&finished_session());

        assert!(text.contains("Patient: Ravi Kumar, 55 y, Male"));
        assert!(text.contains("Risk: High (71.3% confidence)"));
        assert!(text.contains("Cardiology (relevance 9, urgency 10)"));
        assert!(text.contains("RED Chest pain with diaphoresis"));
        assert!(text.contains("1 opinion(s) could not be decoded"));
        assert!(text.contains("Final risk: Critical"));
        assert!(text.contains("Priority: 98/100"));
        assert!(text.contains("* ECG [STAT] (Cardiology)"));
        assert!(text.contains("specialist_opinion [raw payload]"));
    }

    #[test]
    fn summary_is_short() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_summary(&finished_session());

        assert!(text.contains("Session: debug_session"));
        assert!(text.contains("Verdict: Critical -> Cardiology"));
        assert!(!text.contains("Frame Log"));
    }

    #[test]
    fn error_session_shows_detail() {
        colored::control::set_override(false);
        let mut session = Session::new(SessionId::new("s-err").unwrap(), case());
        session.apply(Frame::transport_failure());

        let text = ConsoleFormatter::render(&session, OutputFormat::Summary);
        assert!(text.contains("Error: connection to the triage pipeline was lost"));
    }

    #[test]
    fn json_round_trips_session() {
        let session = finished_session();
        let json = ConsoleFormatter::format_json(&session);
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }
}
