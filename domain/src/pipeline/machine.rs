//! Monotonic phase state machine.
//!
//! [`PhaseMachine`] derives the phase of a run from the frames it sees. It
//! never moves backwards along the order defined on [`Phase`]; requests that
//! would are reported as [`PhaseTransition::Regression`] so the caller can
//! record the anomaly. `Complete` and `Error` are absorbing.

use super::phase::Phase;
use serde::{Deserialize, Serialize};

/// Result of asking the machine to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseTransition {
    /// The phase changed.
    Advanced { from: Phase, to: Phase },
    /// The request was already satisfied.
    Unchanged { phase: Phase },
    /// The requested phase is earlier than the current one; ignored.
    Regression { current: Phase, requested: Phase },
    /// The machine is in a terminal phase; ignored.
    Locked { current: Phase, requested: Phase },
}

impl PhaseTransition {
    pub fn is_advanced(&self) -> bool {
        matches!(self, PhaseTransition::Advanced { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMachine {
    current: Phase,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            current: Phase::Idle,
        }
    }

    pub fn current(&self) -> Phase {
        self.current
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    /// Adopt the phase label carried by a `status` frame unless it is
    /// earlier than the current phase.
    pub fn observe_status(&mut self, requested: Phase) -> PhaseTransition {
        self.advance(requested)
    }

    /// Move to at least `floor`; a later current phase is left alone without
    /// counting as a regression.
    pub fn ensure_at_least(&mut self, floor: Phase) -> PhaseTransition {
        if floor.is_before(self.current) {
            return PhaseTransition::Unchanged {
                phase: self.current,
            };
        }
        self.advance(floor)
    }

    /// Force `Complete`.
    pub fn complete(&mut self) -> PhaseTransition {
        self.force(Phase::Complete)
    }

    /// Force `Error`.
    pub fn fail(&mut self) -> PhaseTransition {
        self.force(Phase::Error)
    }

    fn advance(&mut self, requested: Phase) -> PhaseTransition {
        if requested == self.current {
            return PhaseTransition::Unchanged {
                phase: self.current,
            };
        }
        if self.current.is_terminal() {
            return PhaseTransition::Locked {
                current: self.current,
                requested,
            };
        }
        if requested.is_before(self.current) {
            return PhaseTransition::Regression {
                current: self.current,
                requested,
            };
        }
        self.set(requested)
    }

    fn force(&mut self, requested: Phase) -> PhaseTransition {
        if requested == self.current {
            return PhaseTransition::Unchanged {
                phase: self.current,
            };
        }
        if self.current.is_terminal() {
            return PhaseTransition::Locked {
                current: self.current,
                requested,
            };
        }
        self.set(requested)
    }

    fn set(&mut self, to: Phase) -> PhaseTransition {
        let from = self.current;
        self.current = to;
        PhaseTransition::Advanced { from, to }
    }
}
