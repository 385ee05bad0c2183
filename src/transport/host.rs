//! Daemon host strings (`unix:///path`, `tcp://host:port`)

use std::fmt;

use url::Url;

use super::Protocol;
use crate::errors::{CliError, CliResult};

pub const DEFAULT_UNIX_SOCKET: &str = "/var/run/berth.sock";
pub const DEFAULT_HTTP_PORT: u16 = 2375;
pub const DEFAULT_TLS_PORT: u16 = 2376;
const DEFAULT_TCP_HOST: &str = "127.0.0.1";

/// Where the daemon listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonHost {
    pub protocol: Protocol,
    pub addr: String,
}

impl Default for DaemonHost {
    fn default() -> Self {
        Self {
            protocol: Protocol::LocalSocket,
            addr: DEFAULT_UNIX_SOCKET.to_string(),
        }
    }
}

impl DaemonHost {
    /// Parse a host string. TCP hosts without a port get the TLS or plain
    /// default port.
    pub fn parse(host: &str, tls: bool) -> CliResult<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Ok(Self::default());
        }

        if let Some(path) = host.strip_prefix("unix://") {
            let addr = if path.is_empty() {
                DEFAULT_UNIX_SOCKET
            } else {
                path
            };
            return Ok(Self {
                protocol: Protocol::LocalSocket,
                addr: addr.to_string(),
            });
        }

        let rest = match host.strip_prefix("tcp://") {
            Some(rest) => rest,
            None if host.contains("://") => {
                return Err(invalid(host, "unsupported scheme, expected unix:// or tcp://"))
            }
            None => host,
        };

        let rest = if rest.starts_with(':') || rest.is_empty() {
            format!("{DEFAULT_TCP_HOST}{rest}")
        } else {
            rest.to_string()
        };

        let url = Url::parse(&format!("tcp://{rest}")).map_err(|e| invalid(host, &e.to_string()))?;
        if !matches!(url.path(), "" | "/") {
            return Err(invalid(host, "paths are not allowed in tcp hosts"));
        }

        let hostname = url
            .host_str()
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_TCP_HOST);
        let port = url
            .port()
            .unwrap_or(if tls { DEFAULT_TLS_PORT } else { DEFAULT_HTTP_PORT });

        Ok(Self {
            protocol: Protocol::Network,
            addr: format!("{hostname}:{port}"),
        })
    }
}

impl fmt::Display for DaemonHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            Protocol::LocalSocket => write!(f, "unix://{}", self.addr),
            Protocol::Network => write!(f, "tcp://{}", self.addr),
        }
    }
}

fn invalid(host: &str, reason: &str) -> CliError {
    CliError::InvalidHost {
        host: host.to_string(),
        reason: reason.to_string(),
    }
}
