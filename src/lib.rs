//! berth client library
//!
//! Core of the `berth` command-line client: command resolution, the daemon
//! transport, terminal detection for the caller's streams and the per-command
//! flag sets.

pub mod cli;
pub mod config;
pub mod errors;
pub mod streams;
pub mod templates;
pub mod terminal;
pub mod transport;

// Re-export commonly used types for convenience
pub use cli::{ClientContext, CommandRegistry, FlagSet};
pub use config::{ClientConfig, ConfigManager};
pub use errors::{CliError, CliResult, ExitRequest};
pub use streams::{BufferStream, OutputHandle};
pub use terminal::{TerminalInfo, TerminalProbe};
pub use transport::{DaemonHost, Protocol, Transport};
