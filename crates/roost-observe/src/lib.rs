//! Observability for Roost: structured logging and optional trace export.

pub mod tracing_setup;
