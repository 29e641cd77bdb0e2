//! HTTP adapters

pub mod gateway;

pub use gateway::HttpTriageGateway;
