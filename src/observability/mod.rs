//! Observability subsystem.
//!
//! Structured logging is initialized in `main` via `tracing-subscriber`;
//! this module owns metrics exposition.

pub mod metrics;
