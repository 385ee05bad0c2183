//! Command resolution
//!
//! The first two arguments are tried as a two-word command, then the first
//! argument alone. With no arguments the `help` command runs.

use std::io::Write;

use tracing::debug;

use super::{ClientContext, PROGRAM_NAME};
use crate::errors::{CliError, CliResult, ExitRequest};

impl ClientContext {
    /// Resolve and run the command named by `args`
    pub async fn cmd(&mut self, args: Vec<String>) -> CliResult<()> {
        if args.len() > 1 {
            if let Some(handler) = self.registry().lookup(&args[..2]).map(|e| e.handler) {
                debug!(command = %args[..2].join(" "), "dispatching");
                return handler(self, args[2..].to_vec()).await;
            }
        }

        if let Some(first) = args.first() {
            let Some(handler) = self.registry().lookup(&args[..1]).map(|e| e.handler) else {
                writeln!(
                    self.err(),
                    "{PROGRAM_NAME}: '{first}' is not a {PROGRAM_NAME} command. See '{PROGRAM_NAME} --help'."
                )?;
                return Err(CliError::ExitRequested(ExitRequest::reported(1)));
            };
            debug!(command = %first, "dispatching");
            return handler(self, args[1..].to_vec()).await;
        }

        let handler = self
            .registry()
            .lookup(&["help"])
            .map(|e| e.handler)
            .ok_or(CliError::MissingHelp)?;
        handler(self, Vec::new()).await
    }
}
