//! Daemon transport construction
//!
//! A [`Transport`] is built once per client session and reused for every
//! request. Its behaviour depends on how the daemon is reached:
//!
//! - **Local socket**: no compression, no proxy, and a [`Dialer`] pinned to the
//!   configured socket path. TLS is refused; the socket is reached in plain
//!   HTTP/1.1.
//! - **Network**: a pooled reqwest client with proxy settings from the
//!   environment and gzip responses. Its connector dials the address of each
//!   request, bounded by `connect_timeout`.
//!
//! Both dial strategies share [`DIAL_TIMEOUT`].

pub mod dial;
pub mod host;
pub mod http;
pub mod tls;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::errors::{CliError, CliResult};

pub use dial::{Connection, Dialer};
pub use host::DaemonHost;
pub use http::{DaemonRequest, DaemonResponse};
pub use tls::TlsConfig;

/// Long enough for a slow daemon start, short enough not to hang forever on a
/// dead endpoint.
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(32);

/// How the daemon is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    LocalSocket,
    Network,
}

impl Protocol {
    /// Network name as used in host strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalSocket => "unix",
            Self::Network => "tcp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyPolicy {
    /// `HTTP_PROXY`, `HTTPS_PROXY` and `NO_PROXY` are honoured
    FromEnvironment,
    Disabled,
}

enum Backend {
    LocalSocket(Dialer),
    Network(reqwest::Client),
}

/// Reusable connection transport for one client session
pub struct Transport {
    protocol: Protocol,
    addr: String,
    tls: Option<Arc<TlsConfig>>,
    compression: Compression,
    proxy: ProxyPolicy,
    backend: Backend,
}

impl Transport {
    /// Build the transport for a daemon reached over `protocol` at `addr`
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Tls`] when TLS is requested for a local socket, or
    /// when the TLS material cannot be loaded into the HTTP client.
    pub fn new(protocol: Protocol, addr: &str, tls: Option<Arc<TlsConfig>>) -> CliResult<Self> {
        let transport = match protocol {
            Protocol::LocalSocket => {
                if tls.is_some() {
                    return Err(CliError::tls(format!(
                        "TLS is not supported over the local socket {addr}"
                    )));
                }
                Self {
                    protocol,
                    addr: addr.to_string(),
                    tls,
                    compression: Compression::Disabled,
                    proxy: ProxyPolicy::Disabled,
                    backend: Backend::LocalSocket(Dialer::fixed(addr, DIAL_TIMEOUT)),
                }
            }
            Protocol::Network => {
                let compression = Compression::Enabled;
                let proxy = ProxyPolicy::FromEnvironment;
                let http = build_http_client(tls.as_deref(), compression, proxy)?;
                Self {
                    protocol,
                    addr: addr.to_string(),
                    tls,
                    compression,
                    proxy,
                    backend: Backend::Network(http),
                }
            }
        };

        debug!(
            protocol = %transport.protocol,
            addr = %transport.addr,
            tls = transport.tls.is_some(),
            "transport ready"
        );
        Ok(transport)
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn tls(&self) -> Option<&TlsConfig> {
        self.tls.as_deref()
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn proxy_policy(&self) -> ProxyPolicy {
        self.proxy
    }

    /// Dialer used for local sockets; network transports dial through the
    /// pooled HTTP client instead
    pub fn local_dialer(&self) -> Option<&Dialer> {
        match &self.backend {
            Backend::LocalSocket(dialer) => Some(dialer),
            Backend::Network(_) => None,
        }
    }

    pub fn dial_timeout(&self) -> Duration {
        match &self.backend {
            Backend::LocalSocket(dialer) => dialer.timeout(),
            Backend::Network(_) => DIAL_TIMEOUT,
        }
    }

    /// Issue one request to the daemon
    pub async fn send(&self, scheme: &str, request: DaemonRequest) -> CliResult<DaemonResponse> {
        debug!(method = %request.method, target = %request.path_and_query(), "daemon request");
        match &self.backend {
            Backend::Network(client) => http::send_pooled(client, scheme, &self.addr, request).await,
            Backend::LocalSocket(dialer) => {
                let connection = dialer.dial(self.protocol.as_str(), &self.addr).await?;
                http::send_over_connection(connection, request, self.compression).await
            }
        }
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("protocol", &self.protocol)
            .field("addr", &self.addr)
            .field("tls", &self.tls.is_some())
            .field("compression", &self.compression)
            .field("proxy", &self.proxy)
            .finish()
    }
}

fn build_http_client(
    tls: Option<&TlsConfig>,
    compression: Compression,
    proxy: ProxyPolicy,
) -> CliResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(DIAL_TIMEOUT)
        .gzip(compression == Compression::Enabled);

    if proxy == ProxyPolicy::Disabled {
        builder = builder.no_proxy();
    }

    if let Some(tls) = tls {
        builder = tls.apply(builder)?;
    }

    builder
        .build()
        .map_err(|e| CliError::transport_with_source("failed to create HTTP client", e))
}
