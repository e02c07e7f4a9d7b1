//! Candidate screening assistant: a staged conversation that collects a candidate profile,
//! asks technology-specific questions, and exports the finished session to disk.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
