//! Client context shared by every command handler
//!
//! Holds the daemon address, the caller's streams and their terminal state,
//! the session transport and the loaded client configuration.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hyper::header::USER_AGENT;
use tracing::debug;

use super::handlers;
use super::registry::CommandRegistry;
use super::{API_VERSION, PROGRAM_NAME};
use crate::config::{ClientConfig, ConfigManager};
use crate::errors::{CliError, CliResult};
use crate::streams::{InputStream, OutputHandle, OutputStream};
use crate::templates::TemplateEngine;
use crate::terminal::{RawDescriptor, TerminalInfo};
use crate::transport::{DaemonRequest, DaemonResponse, Protocol, TlsConfig, Transport};

/// Initialize the tracing subscriber. Logs always go to stderr so they never
/// mix with command output.
pub fn init_logging(debug: bool, log_level: &str) {
    let log_level = if debug { "debug" } else { log_level };

    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or_else(|_| tracing::Level::INFO.into())),
        )
        .try_init();

    debug!("Debug logging enabled");
}

/// Everything a command handler needs to talk to the daemon and the user
pub struct ClientContext {
    protocol: Protocol,
    addr: String,
    config: ClientConfig,
    config_dir: Option<PathBuf>,
    input: Option<Box<dyn InputStream>>,
    out: OutputHandle,
    err: OutputHandle,
    key_file: Option<PathBuf>,
    tls: Option<Arc<TlsConfig>>,
    scheme: &'static str,
    terminal_in: TerminalInfo,
    terminal_out: TerminalInfo,
    transport: Transport,
    registry: CommandRegistry,
    templates: TemplateEngine,
}

/// Builder for [`ClientContext`]. Input defaults to stdin and output to
/// stdout; the error stream falls back to the output stream.
pub struct ContextBuilder {
    protocol: Protocol,
    addr: String,
    input: Option<Box<dyn InputStream>>,
    out: OutputHandle,
    err: Option<OutputHandle>,
    key_file: Option<PathBuf>,
    tls: Option<TlsConfig>,
    registry: Option<CommandRegistry>,
    config_dir: Option<PathBuf>,
}

impl ContextBuilder {
    pub fn input(mut self, input: impl InputStream + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Build a context with no input stream at all
    pub fn without_input(mut self) -> Self {
        self.input = None;
        self
    }

    pub fn output(mut self, out: impl OutputStream + 'static) -> Self {
        self.out = OutputHandle::new(out);
        self
    }

    pub fn error(mut self, err: impl OutputStream + 'static) -> Self {
        self.err = Some(OutputHandle::new(err));
        self
    }

    pub fn key_file(mut self, key_file: impl Into<PathBuf>) -> Self {
        self.key_file = Some(key_file.into());
        self
    }

    pub fn tls(mut self, tls: Option<TlsConfig>) -> Self {
        self.tls = tls;
        self
    }

    pub fn registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config_dir(mut self, config_dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(config_dir.into());
        self
    }

    pub fn build(self) -> CliResult<ClientContext> {
        let tls = self.tls.map(Arc::new);
        let scheme = if tls.is_some() { "https" } else { "http" };

        let terminal_in = TerminalInfo::probe(self.input.as_deref());
        let terminal_out = self.out.terminal_info();
        let err = self.err.unwrap_or_else(|| self.out.clone());

        let transport = Transport::new(self.protocol, &self.addr, tls.clone())?;

        debug!(
            protocol = %self.protocol,
            addr = %self.addr,
            scheme,
            tty_in = terminal_in.is_terminal,
            tty_out = terminal_out.is_terminal,
            "client context created"
        );

        Ok(ClientContext {
            protocol: self.protocol,
            addr: self.addr,
            config: ClientConfig::default(),
            config_dir: self.config_dir,
            input: self.input,
            out: self.out,
            err,
            key_file: self.key_file,
            tls,
            scheme,
            terminal_in,
            terminal_out,
            transport,
            registry: self.registry.unwrap_or_else(handlers::default_registry),
            templates: TemplateEngine::new()?,
        })
    }
}

impl ClientContext {
    pub fn builder(protocol: Protocol, addr: impl Into<String>) -> ContextBuilder {
        ContextBuilder {
            protocol,
            addr: addr.into(),
            input: Some(Box::new(io::stdin())),
            out: OutputHandle::new(io::stdout()),
            err: None,
            key_file: None,
            tls: None,
            registry: None,
            config_dir: None,
        }
    }

    /// Refuse to attach a TTY to input that is not a terminal
    pub fn check_tty_input(&self, attach_stdin: bool, tty_mode: bool) -> CliResult<()> {
        if attach_stdin && tty_mode && !self.terminal_in.is_terminal {
            return Err(CliError::TtyInput);
        }
        Ok(())
    }

    /// Load the client configuration. On failure a warning goes to the error
    /// stream and the current configuration is left untouched.
    pub fn load_config_file(&mut self) -> CliResult<()> {
        match ConfigManager::load(self.config_dir.clone()) {
            Ok(manager) => {
                debug!(path = %manager.config_path().display(), "configuration loaded");
                self.config = manager.into_config();
                Ok(())
            }
            Err(err) => {
                if let Err(write_err) = writeln!(self.err, "WARNING: {err}") {
                    debug!(error = %write_err, "failed to write config warning");
                }
                Err(err)
            }
        }
    }

    /// Send a request to the daemon. Non-2xx responses become
    /// [`CliError::HttpStatus`] carrying the daemon's message.
    pub async fn call(&self, request: DaemonRequest) -> CliResult<DaemonResponse> {
        let mut request = request.header(
            USER_AGENT.as_str(),
            format!("{PROGRAM_NAME}/{}", env!("CARGO_PKG_VERSION")),
        );
        for (name, value) in &self.config.http_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = self.transport.send(self.scheme, request).await?;
        if response.is_success() {
            return Ok(response);
        }

        Err(CliError::HttpStatus {
            status_code: response.status,
            reason: daemon_message(&response),
        })
    }

    /// Versioned API path, e.g. `/v1.0/containers/json`
    pub fn api_path(&self, path: &str) -> String {
        format!("/v{API_VERSION}{path}")
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn scheme(&self) -> &'static str {
        self.scheme
    }

    pub fn tls(&self) -> Option<&TlsConfig> {
        self.tls.as_deref()
    }

    pub fn key_file(&self) -> Option<&Path> {
        self.key_file.as_deref()
    }

    pub fn input(&mut self) -> Option<&mut (dyn InputStream + 'static)> {
        self.input.as_deref_mut()
    }

    pub fn out(&self) -> OutputHandle {
        self.out.clone()
    }

    pub fn err(&self) -> OutputHandle {
        self.err.clone()
    }

    pub fn is_terminal_in(&self) -> bool {
        self.terminal_in.is_terminal
    }

    pub fn is_terminal_out(&self) -> bool {
        self.terminal_out.is_terminal
    }

    pub fn in_fd(&self) -> Option<RawDescriptor> {
        self.terminal_in.descriptor
    }

    pub fn out_fd(&self) -> Option<RawDescriptor> {
        self.terminal_out.descriptor
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }
}

/// Daemons answer errors with `{"message": "..."}` or plain text
fn daemon_message(response: &DaemonResponse) -> String {
    let message = response
        .json::<serde_json::Value>()
        .ok()
        .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| response.text());

    let message = message.trim();
    if message.is_empty() {
        format!("daemon returned status {}", response.status)
    } else {
        message.to_string()
    }
}
