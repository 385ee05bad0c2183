//! CLI module providing command-line interface functionality
//!
//! Global options are parsed with clap; the remaining words are resolved
//! against the command registry and run with a [`ClientContext`].

pub mod args;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod flags;
pub mod handlers;
pub mod registry;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use crate::errors::CliResult;

pub use args::ArgProcessor;
pub use commands::Cli;
pub use context::{init_logging, ClientContext, ContextBuilder};
pub use flags::{ErrorPolicy, FlagSet};
pub use registry::{CommandRegistry, Handler, HandlerFuture};

/// Name used in usage and error messages
pub const PROGRAM_NAME: &str = "berth";

/// Daemon API version this client speaks
pub const API_VERSION: &str = "1.0";

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Parse command line arguments, run the requested command and map the
    /// outcome to a process exit status
    pub async fn run() -> ExitCode {
        let cli = Cli::parse();
        init_logging(cli.debug, &cli.log_level);

        match Self::execute(cli).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                if !err.is_reported() {
                    debug!(category = err.category(), "command failed");
                    eprintln!("Error: {err}");
                }
                ExitCode::from(err.exit_code())
            }
        }
    }

    async fn execute(cli: Cli) -> CliResult<()> {
        let processor = ArgProcessor::new(&cli)?;
        let host = processor.resolve_host(&cli)?;
        let tls = processor.resolve_tls(&cli)?;

        let mut context = ClientContext::builder(host.protocol, host.addr)
            .input(io::stdin())
            .output(io::stdout())
            .error(io::stderr())
            .key_file(processor.key_file())
            .tls(tls)
            .config_dir(processor.config_dir())
            .build()?;

        // A broken config file was already reported as a warning
        if let Err(err) = context.load_config_file() {
            debug!(error = %err, "continuing with default configuration");
        }

        context.cmd(cli.command).await
    }
}
