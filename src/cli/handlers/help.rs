//! `help` command

use std::io::Write;

use clap::Arg;

use crate::cli::registry::{CommandRegistry, HandlerFuture};
use crate::cli::{ClientContext, PROGRAM_NAME};

const DESCRIPTION: &str = "Show help for a command";

pub fn register(registry: &mut CommandRegistry) {
    registry.register(&["help"], DESCRIPTION, cmd_help);
}

/// Without arguments, list every command. `help container list` is the same
/// as `container list --help`.
pub fn cmd_help(cli: &mut ClientContext, args: Vec<String>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let flags = cli
            .subcmd("help", "[COMMAND...]", DESCRIPTION, true)
            .arg(Arg::new("command").num_args(0..));
        let matches = flags.parse(&args)?;

        let command: Vec<String> = matches
            .get_many::<String>("command")
            .map(|words| words.cloned().collect())
            .unwrap_or_default();
        if !command.is_empty() {
            let mut target = command;
            target.push("--help".to_string());
            return cli.cmd(target).await;
        }

        let mut out = cli.out();
        writeln!(out, "Usage: {PROGRAM_NAME} [OPTIONS] COMMAND [arg...]")?;
        writeln!(out)?;
        writeln!(out, "A command-line client for the {PROGRAM_NAME} daemon.")?;
        writeln!(out)?;
        writeln!(out, "Commands:")?;

        let width = cli
            .registry()
            .entries()
            .map(|entry| entry.name.len())
            .max()
            .unwrap_or(0);
        for entry in cli.registry().entries() {
            writeln!(out, "    {:<width$}    {}", entry.name, entry.description)?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "Run '{PROGRAM_NAME} COMMAND --help' for more information on a command."
        )?;
        Ok(())
    })
}
