//! TLS settings for network daemons

use std::fmt;
use std::fs;
use std::path::Path;

use reqwest::{Certificate, ClientBuilder, Identity};

use crate::errors::{CliError, CliResult};

/// TLS material loaded at startup.
///
/// `identity_pem` holds the client certificate followed by its private key.
#[derive(Clone, Default)]
pub struct TlsConfig {
    pub ca_pem: Option<Vec<u8>>,
    pub identity_pem: Option<Vec<u8>>,
    pub verify: bool,
}

impl TlsConfig {
    /// Read certificate files into memory
    pub fn from_files(
        ca: Option<&Path>,
        cert_and_key: Option<(&Path, &Path)>,
        verify: bool,
    ) -> CliResult<Self> {
        let ca_pem = ca.map(read_pem).transpose()?;
        let identity_pem = match cert_and_key {
            Some((cert, key)) => {
                let mut pem = read_pem(cert)?;
                if !pem.ends_with(b"\n") {
                    pem.push(b'\n');
                }
                pem.extend(read_pem(key)?);
                Some(pem)
            }
            None => None,
        };

        if verify && ca_pem.is_none() {
            return Err(CliError::tls(
                "certificate verification requires a CA certificate",
            ));
        }

        Ok(Self {
            ca_pem,
            identity_pem,
            verify,
        })
    }

    pub(crate) fn apply(&self, builder: ClientBuilder) -> CliResult<ClientBuilder> {
        let mut builder = builder.use_rustls_tls();

        if let Some(pem) = &self.ca_pem {
            let certificate = Certificate::from_pem(pem)
                .map_err(|e| CliError::tls_with_source("invalid CA certificate", e))?;
            builder = builder.add_root_certificate(certificate);
        }

        if let Some(pem) = &self.identity_pem {
            let identity = Identity::from_pem(pem)
                .map_err(|e| CliError::tls_with_source("invalid client certificate or key", e))?;
            builder = builder.identity(identity);
        }

        if !self.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(builder)
    }
}

fn read_pem(path: &Path) -> CliResult<Vec<u8>> {
    fs::read(path).map_err(|e| CliError::io_with_source(path, "read certificate", e))
}

impl fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfig")
            .field("ca", &self.ca_pem.is_some())
            .field("identity", &self.identity_pem.is_some())
            .field("verify", &self.verify)
            .finish()
    }
}
