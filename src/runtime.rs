//! Runtime glue: service configuration and telemetry for one invocation.

pub mod config;
pub mod telemetry;
