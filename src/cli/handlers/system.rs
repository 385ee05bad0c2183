//! `version` and `ping`

use std::io::Write;

use clap::Arg;
use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::registry::{CommandRegistry, HandlerFuture};
use crate::cli::{ClientContext, API_VERSION};
use crate::transport::DaemonRequest;

pub fn register(registry: &mut CommandRegistry) {
    registry
        .register(&["version"], "Show the berth version information", cmd_version)
        .register(&["ping"], "Check that the daemon is reachable", cmd_ping);
}

/// Build information for this client
#[derive(Debug, Clone, Serialize)]
pub struct ClientVersion {
    pub version: &'static str,
    pub api_version: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
}

impl ClientVersion {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            api_version: API_VERSION,
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

/// Client details are always shown. Server details follow when the daemon
/// answers; otherwise the connection error is returned after the client part.
pub fn cmd_version(cli: &mut ClientContext, args: Vec<String>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let flags = cli
            .subcmd("version", "", "Show the berth version information", true)
            .arg(
                Arg::new("format")
                    .short('f')
                    .long("format")
                    .help("Format the output using the given template"),
            );
        let matches = flags.parse(&args)?;
        let format = matches.get_one::<String>("format");

        let server = cli
            .call(DaemonRequest::get(cli.api_path("/version")))
            .await
            .and_then(|response| response.json::<Value>());

        let data = match &server {
            Ok(server) => json!({ "client": ClientVersion::current(), "server": server }),
            Err(_) => json!({ "client": ClientVersion::current() }),
        };

        let rendered = match format {
            Some(template) => cli.templates().render_inline(template, &data)? + "\n",
            None => cli.templates().render("version", &data)?,
        };
        cli.out().write_all(rendered.as_bytes())?;

        server.map(|_| ())
    })
}

pub fn cmd_ping(cli: &mut ClientContext, args: Vec<String>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let flags = cli.subcmd("ping", "", "Check that the daemon is reachable", true);
        flags.parse(&args)?;

        let response = cli.call(DaemonRequest::get("/_ping")).await?;
        writeln!(cli.out(), "{}", response.text().trim())?;
        Ok(())
    })
}
