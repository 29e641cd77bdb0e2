//! Use cases
//!
//! - [`stream_session::StreamSessionUseCase`] — consume one frame stream
//! - [`run_triage::RunTriageUseCase`] — run lifecycle: start, attach, restart, reset

pub mod run_triage;
pub mod stream_session;
