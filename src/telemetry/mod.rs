//! Telemetry and logging infrastructure
//!
//! Structured logging with tracing; `log` records from dependencies are
//! forwarded into the same subscriber.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogGuard, TelemetryError};
