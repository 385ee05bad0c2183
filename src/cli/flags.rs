//! Per-command flag sets
//!
//! Each handler builds a [`FlagSet`] with [`ClientContext::subcmd`], adds its
//! flags, and parses the arguments left after the command name. Usage text is
//! rendered in the client's own format rather than clap's.

use std::io::Write;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::debug;

use super::{ClientContext, PROGRAM_NAME};
use crate::errors::{CliError, CliResult, ExitRequest};
use crate::streams::OutputHandle;

const HELP_ID: &str = "help";

/// What a parse failure does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Print the error and usage, then request exit status 2
    ExitOnError,
    /// Hand the parse error back to the caller
    ContinueOnError,
}

impl ClientContext {
    /// Create the flag set for subcommand `name`
    pub fn subcmd(
        &self,
        name: &str,
        signature: &str,
        description: &str,
        exit_on_error: bool,
    ) -> FlagSet {
        let policy = if exit_on_error {
            ErrorPolicy::ExitOnError
        } else {
            ErrorPolicy::ContinueOnError
        };
        FlagSet::new(name, signature, description, policy, self.out(), self.err())
    }
}

/// Named flag set for one subcommand
pub struct FlagSet {
    name: String,
    signature: String,
    description: String,
    policy: ErrorPolicy,
    command: Command,
    out: OutputHandle,
    err: OutputHandle,
}

impl FlagSet {
    pub fn new(
        name: &str,
        signature: &str,
        description: &str,
        policy: ErrorPolicy,
        out: OutputHandle,
        err: OutputHandle,
    ) -> Self {
        let command = Command::new(name.to_string())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(
                Arg::new(HELP_ID)
                    .short('h')
                    .long("help")
                    .action(ArgAction::SetTrue)
                    .hide(true),
            );

        Self {
            name: name.to_string(),
            signature: signature.to_string(),
            description: description.to_string(),
            policy,
            command,
            out,
            err,
        }
    }

    /// Add a flag or positional argument. Hidden arguments are treated as
    /// deprecated and left out of usage.
    pub fn arg(mut self, arg: Arg) -> Self {
        self.command = self.command.arg(arg);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Number of visible, non-deprecated options
    pub fn option_count(&self) -> usize {
        visible_options(&self.command).count()
    }

    /// Write usage to the output stream and request a clean exit
    pub fn usage(&self) -> CliError {
        let mut out = self.out.clone();
        if let Err(err) = out
            .write_all(self.render_usage().as_bytes())
            .and_then(|()| out.flush())
        {
            debug!(error = %err, command = %self.name, "failed to write usage");
        }
        CliError::ExitRequested(ExitRequest::reported(0))
    }

    pub fn render_usage(&self) -> String {
        let options = if self.option_count() > 0 {
            "[OPTIONS] "
        } else {
            ""
        };
        let mut text = format!(
            "\nUsage: {PROGRAM_NAME} {} {options}{}\n\n{}\n\n",
            self.name, self.signature, self.description
        );
        text.push_str(&self.render_options());
        text
    }

    fn render_options(&self) -> String {
        // Action defaults such as "false" only exist after the command is built
        let mut command = self.command.clone();
        command.build();

        let rows: Vec<(String, String)> = visible_options(&command)
            .map(|arg| {
                let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
                (flag_names(arg), help)
            })
            .collect();
        let width = rows.iter().map(|(names, _)| names.len()).max().unwrap_or(0);

        rows.iter()
            .map(|(names, help)| format!("  {names:<width$}    {help}").trim_end().to_string() + "\n")
            .collect()
    }

    /// Parse subcommand arguments. `-h`/`--help` prints usage and requests a
    /// clean exit.
    pub fn parse(&self, args: &[String]) -> CliResult<ArgMatches> {
        match self.command.clone().try_get_matches_from(args) {
            Ok(matches) if matches.get_flag(HELP_ID) => Err(self.usage()),
            Ok(matches) => Ok(matches),
            Err(err) => match self.policy {
                ErrorPolicy::ExitOnError => {
                    let message = err.to_string();
                    let message = message.lines().next().unwrap_or_default();
                    let mut stream = self.err.clone();
                    if let Err(err) = writeln!(stream, "{message}")
                        .and_then(|()| stream.write_all(self.render_usage().as_bytes()))
                    {
                        debug!(error = %err, command = %self.name, "failed to write usage");
                    }
                    Err(CliError::ExitRequested(ExitRequest::reported(2)))
                }
                ErrorPolicy::ContinueOnError => Err(CliError::FlagParse(err)),
            },
        }
    }
}

fn visible_options(command: &Command) -> impl Iterator<Item = &Arg> {
    command
        .get_arguments()
        .filter(|arg| !arg.is_positional() && !arg.is_hide_set())
}

/// `-a, --all=false` or `--format=""`
fn flag_names(arg: &Arg) -> String {
    let mut names = Vec::new();
    if let Some(short) = arg.get_short() {
        names.push(format!("-{short}"));
    }
    if let Some(long) = arg.get_long() {
        names.push(format!("--{long}"));
    }
    let mut text = names.join(", ");

    let defaults: Vec<String> = arg
        .get_default_values()
        .iter()
        .map(|v| v.to_string_lossy().into_owned())
        .collect();
    if !defaults.is_empty() {
        text.push('=');
        text.push_str(&defaults.join(","));
    } else if arg.get_action().takes_values() {
        text.push_str("=\"\"");
    }
    text
}
