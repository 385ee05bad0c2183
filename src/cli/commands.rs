//! Global command line options
//!
//! Everything after the first command word is collected untouched and handed
//! to the command resolver, so each command parses its own flags.

use clap::Parser;
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug)]
#[command(name = "berth")]
#[command(about = "A command-line client for the berth daemon")]
#[command(version)]
pub struct Cli {
    /// Daemon socket to connect to, e.g. unix:///var/run/berth.sock or tcp://host:2376
    #[arg(short = 'H', long, env = "BERTH_HOST")]
    pub host: Option<String>,

    /// Enable debug logging
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Logging level
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,

    /// Use TLS; implied by --tlsverify
    #[arg(long)]
    pub tls: bool,

    /// Use TLS and verify the daemon certificate
    #[arg(long, env = "BERTH_TLS_VERIFY")]
    pub tlsverify: bool,

    /// Trust certs signed only by this CA
    #[arg(long, value_name = "PATH")]
    pub tlscacert: Option<PathBuf>,

    /// Path to TLS certificate file
    #[arg(long, value_name = "PATH")]
    pub tlscert: Option<PathBuf>,

    /// Path to TLS key file
    #[arg(long, value_name = "PATH")]
    pub tlskey: Option<PathBuf>,

    /// Location of client config files
    #[arg(long, value_name = "DIR", env = "BERTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run, followed by its arguments
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}
