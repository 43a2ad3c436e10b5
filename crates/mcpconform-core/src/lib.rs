//! # mcpconform core
//!
//! Shared plumbing for the conformance harness:
//! - Environment-driven configuration (`MCPCONFORM_*`, `.env` aware)
//! - The catalog of fixture servers the suite talks to
//! - Tracing subscriber setup for binaries and tests

pub mod config;
pub mod fixture;
pub mod logging;

pub use config::{ConfigError, ConformanceConfig};
pub use fixture::Fixture;
