//! Captured-stream replay

mod file_gateway;

pub use file_gateway::FileReplayGateway;
