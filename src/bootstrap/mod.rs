//! Bootstrap layer: modules that run before any service starts.
//!
//! - **cli** — command-line flags shared by both binaries.
//! - **logger** — tracing-subscriber initialisation.

pub mod cli;
pub mod logger;
