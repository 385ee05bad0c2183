//! Local socket dial strategy

use std::time::Duration;

use tokio::net::UnixStream;
use tracing::debug;

use crate::errors::{CliError, CliResult};

/// An open connection to a local daemon
pub type Connection = UnixStream;

/// Dials the configured daemon socket. The network and address handed to
/// [`Dialer::dial`] are ignored, so every connection lands on the same socket.
#[derive(Debug, Clone)]
pub struct Dialer {
    path: String,
    timeout: Duration,
}

impl Dialer {
    pub fn fixed(path: &str, timeout: Duration) -> Self {
        Self {
            path: path.to_string(),
            timeout,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn dial(&self, _network: &str, _addr: &str) -> CliResult<Connection> {
        debug!(path = %self.path, "dialing daemon");
        match tokio::time::timeout(self.timeout, UnixStream::connect(&self.path)).await {
            Ok(Ok(connection)) => Ok(connection),
            Ok(Err(source)) => Err(CliError::Connect {
                addr: self.path.clone(),
                source,
            }),
            Err(_) => Err(CliError::DialTimeout {
                addr: self.path.clone(),
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}
