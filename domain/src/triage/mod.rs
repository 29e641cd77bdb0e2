//! Triage payload types.
//!
//! The pipeline stages are external producers; their outputs arrive as
//! opaque payloads. These are read-side views decoded on demand:
//!
//! - [`case_input::CaseInput`] — the submitted case
//! - [`classification::RiskPrediction`] — classification stage output
//! - [`opinion::SpecialistOpinion`] / [`opinion::OtherSpecialtyScore`] — council output
//! - [`verdict::CmoVerdict`] — synthesized verdict

pub mod case_input;
pub mod classification;
pub mod opinion;
pub mod verdict;
