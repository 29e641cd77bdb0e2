//! Pipeline progress: the [`phase::Phase`] order and the monotonic
//! [`machine::PhaseMachine`] derived from status frames.

pub mod machine;
pub mod phase;
