//! `container` commands and the `ps` shorthand

use std::io::Write;

use clap::{Arg, ArgAction};
use serde_json::Value;

use crate::cli::registry::{CommandRegistry, HandlerFuture};
use crate::cli::{ClientContext, PROGRAM_NAME};
use crate::errors::CliError;
use crate::transport::DaemonRequest;

const SHORT_ID_LEN: usize = 12;
const COMMAND_WIDTH: usize = 20;

pub fn register(registry: &mut CommandRegistry) {
    registry
        .register(&["container"], "Manage containers", cmd_container)
        .register(&["container", "list"], "List containers", cmd_container_list)
        .register(&["ps"], "List containers", cmd_container_list);
}

/// Reached only when the second word is not a known container command
pub fn cmd_container(cli: &mut ClientContext, args: Vec<String>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let flags = cli
            .subcmd("container", "COMMAND", "Manage containers", true)
            .arg(Arg::new("command").num_args(0..));
        let matches = flags.parse(&args)?;

        if let Some(unknown) = matches.get_many::<String>("command").and_then(|mut c| c.next()) {
            return Err(CliError::invalid_argument(
                unknown.clone(),
                format!("not a container command, see '{PROGRAM_NAME} container --help'"),
            ));
        }

        let mut out = cli.out();
        writeln!(out, "Usage: {PROGRAM_NAME} container COMMAND")?;
        writeln!(out)?;
        writeln!(out, "Commands:")?;
        for entry in cli.registry().entries() {
            if let Some(sub) = entry.name.strip_prefix("container ") {
                writeln!(out, "    {sub:<12}{}", entry.description)?;
            }
        }
        Ok(())
    })
}

pub fn cmd_container_list(cli: &mut ClientContext, args: Vec<String>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let flags = cli
            .subcmd("container list", "", "List containers", true)
            .arg(
                Arg::new("all")
                    .short('a')
                    .long("all")
                    .action(ArgAction::SetTrue)
                    .help("Show all containers (default shows just running)"),
            )
            .arg(
                Arg::new("quiet")
                    .short('q')
                    .long("quiet")
                    .action(ArgAction::SetTrue)
                    .help("Only display container IDs"),
            )
            .arg(
                Arg::new("no-trunc")
                    .long("no-trunc")
                    .action(ArgAction::SetTrue)
                    .help("Don't truncate output"),
            )
            .arg(
                Arg::new("format")
                    .long("format")
                    .help("Pretty-print containers using a template"),
            );
        let matches = flags.parse(&args)?;
        let no_trunc = matches.get_flag("no-trunc");

        let mut request = DaemonRequest::get(cli.api_path("/containers/json"));
        if matches.get_flag("all") {
            request = request.query("all", "1");
        }
        let containers: Vec<Value> = cli.call(request).await?.json()?;

        let mut out = cli.out();
        if matches.get_flag("quiet") {
            for container in &containers {
                writeln!(out, "{}", container_id(container, no_trunc))?;
            }
            return Ok(());
        }

        let format = matches
            .get_one::<String>("format")
            .cloned()
            .or_else(|| cli.config().ps_format.clone());
        if let Some(format) = format {
            for container in &containers {
                let line = cli.templates().render_inline(&format, container)?;
                writeln!(out, "{line}")?;
            }
            return Ok(());
        }

        let rows: Vec<[String; 5]> = containers
            .iter()
            .map(|c| {
                [
                    container_id(c, no_trunc),
                    text_field(c, "Image"),
                    command_field(c, no_trunc),
                    text_field(c, "Status"),
                    names_field(c),
                ]
            })
            .collect();
        write_table(
            &mut out,
            ["CONTAINER ID", "IMAGE", "COMMAND", "STATUS", "NAMES"],
            &rows,
        )?;
        Ok(())
    })
}

fn text_field(container: &Value, key: &str) -> String {
    container[key].as_str().unwrap_or_default().to_string()
}

fn container_id(container: &Value, no_trunc: bool) -> String {
    let id = text_field(container, "Id");
    if no_trunc {
        id
    } else {
        id.chars().take(SHORT_ID_LEN).collect()
    }
}

fn command_field(container: &Value, no_trunc: bool) -> String {
    let command = text_field(container, "Command");
    if no_trunc || command.chars().count() <= COMMAND_WIDTH {
        return format!("\"{command}\"");
    }
    let truncated: String = command.chars().take(COMMAND_WIDTH - 1).collect();
    format!("\"{truncated}…\"")
}

/// Daemon names carry a leading slash
fn names_field(container: &Value) -> String {
    container["Names"]
        .as_array()
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(|name| name.trim_start_matches('/'))
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}

fn write_table<W: Write>(
    out: &mut W,
    headers: [&str; 5],
    rows: &[[String; 5]],
) -> std::io::Result<()> {
    let mut widths = headers.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("   ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.to_vec()))?;
    for row in rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}
