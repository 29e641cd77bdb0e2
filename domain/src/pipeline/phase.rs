//! Pipeline phases

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Coarse-grained progress of a triage run.
///
/// The non-error phases form a strict total order:
/// `Idle < Init < Classification < SpecialistCouncil < CmoSynthesis < Complete`.
/// `Error` sits outside that order and is reachable from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Init,
    Classification,
    SpecialistCouncil,
    CmoSynthesis,
    Complete,
    Error,
}

impl Phase {
    /// Position in the total order, `None` for `Error`.
    pub fn rank(self) -> Option<u8> {
        match self {
            Phase::Idle => Some(0),
            Phase::Init => Some(1),
            Phase::Classification => Some(2),
            Phase::SpecialistCouncil => Some(3),
            Phase::CmoSynthesis => Some(4),
            Phase::Complete => Some(5),
            Phase::Error => None,
        }
    }

    /// True if `self` comes strictly before `other` in the total order.
    ///
    /// Always false when either side is `Error`.
    pub fn is_before(self, other: Phase) -> bool {
        matches!((self.rank(), other.rank()), (Some(a), Some(b)) if a < b)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Complete | Phase::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Init => "init",
            Phase::Classification => "classification",
            Phase::SpecialistCouncil => "specialist_council",
            Phase::CmoSynthesis => "cmo_synthesis",
            Phase::Complete => "complete",
            Phase::Error => "error",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Init => "Initializing",
            Phase::Classification => "Risk Classification",
            Phase::SpecialistCouncil => "Specialist Council",
            Phase::CmoSynthesis => "CMO Synthesis",
            Phase::Complete => "Complete",
            Phase::Error => "Error",
        }
    }
}

impl FromStr for Phase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Phase::Idle),
            "init" => Ok(Phase::Init),
            "classification" => Ok(Phase::Classification),
            "specialist_council" => Ok(Phase::SpecialistCouncil),
            "cmo_synthesis" => Ok(Phase::CmoSynthesis),
            "complete" => Ok(Phase::Complete),
            "error" => Ok(Phase::Error),
            other => Err(DomainError::UnknownPhase(other.to_string())),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
