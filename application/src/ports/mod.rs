//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod audit_logger;
pub mod frame_source;
pub mod session_observer;
pub mod triage_gateway;
