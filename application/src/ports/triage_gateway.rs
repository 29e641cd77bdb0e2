//! Triage gateway port
//!
//! Defines how the application initiates a run against the pipeline backend
//! and obtains the event stream for it.

use super::frame_source::FrameSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use triage_domain::{CaseInput, SessionId};

/// Errors that can occur while initiating a run
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Run rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Body of the run-initiation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub user_id: String,
    pub session_id: SessionId,
    pub patient_data: CaseInput,
}

impl RunRequest {
    pub fn new(user_id: impl Into<String>, session_id: SessionId, patient_data: CaseInput) -> Self {
        Self {
            user_id: user_id.into(),
            session_id,
            patient_data,
        }
    }
}

/// Gateway to the triage pipeline
///
/// This port defines how a run is started. Implementations (adapters) live in
/// the infrastructure layer.
#[async_trait]
pub trait TriageGateway: Send + Sync {
    /// Initiate a run and return the live event stream for it.
    async fn open_stream(&self, request: &RunRequest) -> Result<Box<dyn FrameSource>, GatewayError>;
}
