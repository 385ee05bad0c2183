//! Error types for the berth client
//!
//! Every fallible operation in the client returns [`CliError`]. The variants are
//! grouped by the part of the client that raises them so the top-level caller
//! can decide how to report each one.

use std::path::PathBuf;
use thiserror::Error;

/// Request to terminate the process with a specific status.
///
/// Raised by the paths that must end the invocation deterministically (unknown
/// commands, usage output, flag parse failures). Only the binary entrypoint
/// turns it into an actual process exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitRequest {
    pub code: u8,
    /// The user-facing message has already been written.
    pub reported: bool,
}

impl ExitRequest {
    /// Exit whose message was already printed
    pub fn reported(code: u8) -> Self {
        Self {
            code,
            reported: true,
        }
    }
}

/// Main client error type
#[derive(Error, Debug)]
pub enum CliError {
    // Dispatch and usage
    #[error("exit requested with status {}", .0.code)]
    ExitRequested(ExitRequest),

    #[error("no help command is registered")]
    MissingHelp,

    #[error("{0}")]
    FlagParse(#[from] clap::Error),

    #[error("Invalid command argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    #[error("cannot enable tty mode on non tty input")]
    TtyInput,

    // Configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File I/O error for '{path}': {operation}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Transport
    #[error("Invalid daemon host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("TLS configuration error: {message}")]
    Tls {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to build transport: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Cannot connect to the berth daemon at {addr}. Is the daemon running on this host?")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {timeout_secs} seconds connecting to {addr}")]
    DialTimeout { addr: String, timeout_secs: u64 },

    #[error("HTTP request failed: {method} {url}")]
    HttpRequest {
        method: String,
        url: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Error response from daemon: {reason}")]
    HttpStatus { status_code: u16, reason: String },

    // Output
    #[error("Template error: {message}")]
    Template {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("JSON error: {context}")]
    Json {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Convenience type alias for Results using CliError
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create a new Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new Config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new I/O error with source
    pub fn io_with_source(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls {
            message: message.into(),
            source: None,
        }
    }

    pub fn tls_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Tls {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new HttpRequest error with source
    pub fn http_request(
        method: impl Into<String>,
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::HttpRequest {
            method: method.into(),
            url: url.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn template_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Template {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Status the process should exit with when this error reaches the top
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ExitRequested(request) => request.code,
            _ => 1,
        }
    }

    /// Whether the user already saw a message for this error
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::ExitRequested(request) if request.reported)
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::ExitRequested(_)
            | Self::MissingHelp
            | Self::FlagParse(_)
            | Self::InvalidArgument { .. }
            | Self::TtyInput => "cli",
            Self::Config { .. } | Self::Io { .. } => "config",
            Self::InvalidHost { .. }
            | Self::Tls { .. }
            | Self::Transport { .. }
            | Self::Connect { .. }
            | Self::DialTimeout { .. } => "transport",
            Self::HttpRequest { .. } | Self::HttpStatus { .. } => "network",
            Self::Template { .. } | Self::Json { .. } => "output",
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        let operation = match err.kind() {
            std::io::ErrorKind::NotFound => "file not found",
            std::io::ErrorKind::PermissionDenied => "permission denied",
            std::io::ErrorKind::BrokenPipe => "broken pipe",
            _ => "I/O operation",
        }
        .to_string();

        Self::Io {
            path: PathBuf::from("unknown"),
            operation,
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        let context = if err.is_syntax() {
            format!("syntax error at line {} column {}", err.line(), err.column())
        } else if err.is_eof() {
            "unexpected end of JSON input".to_string()
        } else {
            "JSON data error".to_string()
        };
        Self::Json {
            context,
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::HttpStatus {
                status_code: status.as_u16(),
                reason: err.to_string(),
            }
        } else {
            Self::HttpRequest {
                method: "UNKNOWN".to_string(),
                url: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                source: Some(Box::new(err)),
            }
        }
    }
}
