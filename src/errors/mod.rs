//! Centralized error handling module
//!
//! All client components report failures through [`CliError`]; the binary
//! entrypoint is the only place that maps them to a process exit status.

pub mod types;

pub use types::{CliError, CliResult, ExitRequest};
