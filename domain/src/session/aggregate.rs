//! Aggregate builder: folds dispatched frames into a [`Session`].
//!
//! | event | effect |
//! |-------|--------|
//! | `status` | phase adopts the label unless it would regress |
//! | `classification_result` | sets classification (last write wins), phase ≥ classification |
//! | `specialist_opinion` | appends to opinions |
//! | `other_specialty_scores` | sets the side-channel annotation |
//! | `cmo_verdict` | sets verdict (last write wins) |
//! | `complete` | terminates, phase = complete |
//! | `error` | terminates, phase = error, records the detail |
//!
//! Every frame is appended to the log, including frames that arrive after
//! termination; those leave every other field untouched.

use super::entities::{Anomaly, LogEntry, Session};
use crate::pipeline::machine::PhaseTransition;
use crate::pipeline::phase::Phase;
use crate::stream::event_type::EventType;
use crate::stream::frame::Frame;
use crate::stream::payload::Payload;

/// Fallback error detail when an `error` frame carries no message.
pub const UNKNOWN_ERROR_DETAIL: &str = "unknown pipeline error";

/// What applying one frame did to the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Applied {
    /// Phase machine outcome, when the frame touched the phase.
    pub transition: Option<PhaseTransition>,
    /// Anomaly recorded on the frame's log entry.
    pub anomaly: Option<Anomaly>,
    /// True if this frame terminated the session.
    pub terminated: bool,
}

impl Applied {
    /// `(from, to)` when the phase actually changed.
    pub fn phase_change(&self) -> Option<(Phase, Phase)> {
        match self.transition {
            Some(PhaseTransition::Advanced { from, to }) => Some((from, to)),
            _ => None,
        }
    }
}

impl Session {
    /// Apply one dispatched frame.
    pub fn apply(&mut self, frame: Frame) -> Applied {
        let mut applied = Applied::default();

        if self.terminated {
            applied.anomaly = Some(Anomaly::LateFrame);
            self.append(frame, applied.anomaly.clone());
            return applied;
        }

        match frame.event_type() {
            EventType::Status => match status_phase(frame.payload()) {
                Ok(requested) => {
                    let transition = self.phase.observe_status(requested);
                    applied.anomaly = transition_anomaly(transition);
                    applied.transition = Some(transition);
                }
                Err(detail) => {
                    applied.anomaly = Some(Anomaly::InvalidStatus { detail });
                }
            },
            EventType::ClassificationResult => {
                let previous = self.classification.replace(frame.payload().clone());
                applied.anomaly = previous.map(|_| replaced("classification"));
                let transition = self.phase.ensure_at_least(Phase::Classification);
                if applied.anomaly.is_none() {
                    applied.anomaly = transition_anomaly(transition);
                }
                applied.transition = Some(transition);
            }
            EventType::SpecialistOpinion => {
                self.opinions.push(frame.payload().clone());
            }
            EventType::OtherSpecialtyScores => {
                let previous = self
                    .other_specialty_scores
                    .replace(frame.payload().clone());
                applied.anomaly = previous.map(|_| replaced("other_specialty_scores"));
            }
            EventType::CmoVerdict => {
                let previous = self.verdict.replace(frame.payload().clone());
                applied.anomaly = previous.map(|_| replaced("verdict"));
            }
            EventType::Complete => {
                self.terminated = true;
                applied.terminated = true;
                let transition = self.phase.complete();
                applied.anomaly = transition_anomaly(transition);
                applied.transition = Some(transition);
            }
            EventType::Error => {
                self.terminated = true;
                applied.terminated = true;
                self.error = Some(error_detail(frame.payload()));
                let transition = self.phase.fail();
                applied.anomaly = transition_anomaly(transition);
                applied.transition = Some(transition);
            }
            EventType::Unknown(_) => {}
        }

        self.append(frame, applied.anomaly.clone());
        applied
    }

    fn append(&mut self, frame: Frame, anomaly: Option<Anomaly>) {
        self.log.push(LogEntry { frame, anomaly });
    }
}

fn status_phase(payload: &Payload) -> Result<Phase, String> {
    let label = match payload {
        Payload::Json(value) => value
            .get("phase")
            .and_then(|phase| phase.as_str())
            .ok_or_else(|| "missing string field `phase`".to_string())?,
        Payload::Raw(_) => return Err("payload is not JSON".to_string()),
        Payload::Empty => return Err("empty payload".to_string()),
    };
    match label.parse::<Phase>() {
        Ok(Phase::Error) => Err("status cannot carry the error phase".to_string()),
        Ok(phase) => Ok(phase),
        Err(e) => Err(e.to_string()),
    }
}

fn error_detail(payload: &Payload) -> String {
    match payload {
        Payload::Json(value) => value
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or(UNKNOWN_ERROR_DETAIL)
            .to_string(),
        Payload::Raw(text) if !text.trim().is_empty() => text.clone(),
        _ => UNKNOWN_ERROR_DETAIL.to_string(),
    }
}

fn transition_anomaly(transition: PhaseTransition) -> Option<Anomaly> {
    match transition {
        PhaseTransition::Regression { current, requested } => {
            Some(Anomaly::PhaseRegression { current, requested })
        }
        PhaseTransition::Locked { current, requested } => {
            Some(Anomaly::PhaseLocked { current, requested })
        }
        PhaseTransition::Advanced { .. } | PhaseTransition::Unchanged { .. } => None,
    }
}

fn replaced(field: &str) -> Anomaly {
    Anomaly::Replaced {
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entities::SessionId;
    use crate::triage::case_input::sample_case;
    use serde_json::json;

    fn session() -> Session {
        Session::new(SessionId::new("case-1").unwrap(), sample_case())
    }

    fn frame(event: &str, payload: serde_json::Value) -> Frame {
        Frame::new(EventType::from_wire(event), Payload::Json(payload))
    }

    fn status(phase: &str) -> Frame {
        frame("status", json!({"phase": phase, "message": "progress"}))
    }

    fn opinion(specialty: &str) -> Frame {
        frame(
            "specialist_opinion",
            json!({"specialty": specialty, "relevance_score": 5, "urgency_score": 5,
                   "one_liner": "ok", "flags": [], "claims_primary": false}),
        )
    }

    #[test]
    fn full_run_reconstructs_session() {
        let mut session = session();
        session.apply(status("init"));
        session.apply(status("classification"));
        session.apply(frame(
            "classification_result",
            json!({"risk_level": "High", "confidence": 71.3}),
        ));
        session.apply(status("specialist_council"));
        for specialty in ["Cardiology", "Neurology", "Pulmonology"] {
            session.apply(opinion(specialty));
        }
        session.apply(status("cmo_synthesis"));
        session.apply(frame(
            "cmo_verdict",
            json!({"final_risk_level": "Critical", "priority_score": 98}),
        ));
        let applied = session.apply(Frame::new(EventType::Complete, Payload::Empty));

        assert!(applied.terminated);
        assert_eq!(
            applied.phase_change(),
            Some((Phase::CmoSynthesis, Phase::Complete))
        );
        assert_eq!(session.phase(), Phase::Complete);
        assert!(session.is_terminated());
        assert_eq!(session.risk_prediction().unwrap().risk_level, "High");
        assert_eq!(session.opinions().len(), 3);
        assert_eq!(session.cmo_verdict().unwrap().final_risk_level, "Critical");
        assert_eq!(session.log().len(), 10);
        assert_eq!(session.anomalies().count(), 0);
    }

    #[test]
    fn opinions_accumulate_in_arrival_order() {
        let mut session = session();
        let specialties = ["Emergency", "Cardiology", "Gastro", "Neurology", "General"];
        for specialty in specialties {
            session.apply(opinion(specialty));
        }
        let seen: Vec<_> = session
            .specialist_opinions()
            .into_iter()
            .map(|o| o.specialty)
            .collect();
        assert_eq!(seen, specialties);
    }

    #[test]
    fn duplicate_specialty_is_kept() {
        let mut session = session();
        session.apply(opinion("Cardiology"));
        session.apply(opinion("Cardiology"));
        assert_eq!(session.opinions().len(), 2);
    }

    #[test]
    fn raw_opinion_is_still_appended() {
        let mut session = session();
        session.apply(Frame::new(
            EventType::SpecialistOpinion,
            Payload::Raw("{broken".into()),
        ));
        assert_eq!(session.opinions().len(), 1);
        assert!(session.specialist_opinions().is_empty());
    }

    #[test]
    fn status_regression_is_logged_not_applied() {
        let mut session = session();
        session.apply(status("specialist_council"));
        let applied = session.apply(status("init"));

        assert_eq!(session.phase(), Phase::SpecialistCouncil);
        assert_eq!(
            applied.anomaly,
            Some(Anomaly::PhaseRegression {
                current: Phase::SpecialistCouncil,
                requested: Phase::Init
            })
        );
        assert_eq!(session.log().len(), 2);
        assert_eq!(session.log()[1].anomaly, applied.anomaly);
    }

    #[test]
    fn invalid_status_labels_are_anomalies() {
        let mut session = session();
        for payload in [
            Payload::Json(json!({"phase": "triage"})),
            Payload::Json(json!({"phase": "error"})),
            Payload::Json(json!({"message": "no phase"})),
            Payload::Raw("phase=init".into()),
        ] {
            let applied = session.apply(Frame::new(EventType::Status, payload));
            assert!(matches!(
                applied.anomaly,
                Some(Anomaly::InvalidStatus { .. })
            ));
        }
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.is_terminated());
    }

    #[test]
    fn classification_raises_phase_floor() {
        let mut session = session();
        let applied = session.apply(frame("classification_result", json!({"risk_level": "Low"})));
        assert_eq!(
            applied.phase_change(),
            Some((Phase::Idle, Phase::Classification))
        );

        session.apply(status("cmo_synthesis"));
        let applied = session.apply(frame("classification_result", json!({"risk_level": "High"})));
        assert_eq!(session.phase(), Phase::CmoSynthesis);
        assert_eq!(
            applied.anomaly,
            Some(Anomaly::Replaced {
                field: "classification".into()
            })
        );
        assert_eq!(session.risk_prediction().unwrap().risk_level, "High");
    }

    #[test]
    fn verdict_is_last_write_wins() {
        let mut session = session();
        session.apply(frame("cmo_verdict", json!({"final_risk_level": "Medium"})));
        session.apply(frame("cmo_verdict", json!({"final_risk_level": "High"})));
        assert_eq!(session.cmo_verdict().unwrap().final_risk_level, "High");
    }

    #[test]
    fn other_scores_are_kept_apart_from_opinions() {
        let mut session = session();
        session.apply(frame(
            "other_specialty_scores",
            json!([{"department": "Nephrology", "relevance": 4, "reason": "CKD"}]),
        ));
        assert!(session.opinions().is_empty());
        assert_eq!(session.other_specialties()[0].department, "Nephrology");
    }

    #[test]
    fn terminated_session_is_frozen() {
        let mut session = session();
        session.apply(status("init"));
        session.apply(opinion("Cardiology"));
        session.apply(Frame::new(EventType::Complete, Payload::Empty));
        let frozen = session.clone();

        let late = [
            status("cmo_synthesis"),
            opinion("Neurology"),
            frame("classification_result", json!({"risk_level": "Low"})),
            frame("cmo_verdict", json!({"final_risk_level": "Low"})),
            frame("error", json!({"message": "late"})),
            Frame::new(EventType::Complete, Payload::Empty),
        ];
        for frame in late {
            let applied = session.apply(frame);
            assert_eq!(applied.anomaly, Some(Anomaly::LateFrame));
            assert!(applied.transition.is_none());
            assert!(!applied.terminated);
        }

        assert_eq!(session.phase(), frozen.phase());
        assert_eq!(session.opinions(), frozen.opinions());
        assert_eq!(session.classification(), frozen.classification());
        assert_eq!(session.verdict(), frozen.verdict());
        assert_eq!(session.error(), None);
        assert_eq!(session.log().len(), frozen.log().len() + 6);
    }

    #[test]
    fn error_records_detail_and_terminates() {
        let mut session = session();
        session.apply(status("classification"));
        let applied = session.apply(frame("error", json!({"message": "model unavailable"})));

        assert!(applied.terminated);
        assert_eq!(session.phase(), Phase::Error);
        assert_eq!(session.error(), Some("model unavailable"));
    }

    #[test]
    fn error_detail_falls_back() {
        let mut session = session();
        session.apply(Frame::new(EventType::Error, Payload::Raw("boom".into())));
        assert_eq!(session.error(), Some("boom"));

        let mut session = self::session();
        session.apply(Frame::new(EventType::Error, Payload::Empty));
        assert_eq!(session.error(), Some(UNKNOWN_ERROR_DETAIL));
    }

    #[test]
    fn transport_failure_terminates_with_fixed_message() {
        let mut session = session();
        session.apply(status("init"));
        session.apply(Frame::transport_failure());

        assert_eq!(session.phase(), Phase::Error);
        assert!(session.is_terminated());
        assert_eq!(
            session.error(),
            Some(crate::stream::frame::TRANSPORT_FAILURE_MESSAGE)
        );
        assert!(session.log()[1].frame.is_synthetic());
    }

    #[test]
    fn log_preserves_frame_order() {
        let mut session = session();
        let frames = vec![
            status("init"),
            opinion("A"),
            frame("unknown_future_event", json!({})),
            opinion("B"),
            status("specialist_council"),
        ];
        for frame in frames.clone() {
            session.apply(frame);
        }
        let logged: Vec<_> = session.log().iter().map(|e| e.frame.clone()).collect();
        assert_eq!(logged, frames);
    }
}
