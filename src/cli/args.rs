//! Resolution of global options into daemon connection settings

use std::path::{Path, PathBuf};

use tracing::debug;

use super::Cli;
use crate::config::ConfigManager;
use crate::errors::CliResult;
use crate::transport::{DaemonHost, TlsConfig};

pub const CERT_PATH_ENV: &str = "BERTH_CERT_PATH";

const CA_FILE: &str = "ca.pem";
const CERT_FILE: &str = "cert.pem";
const KEY_FILE: &str = "key.pem";
const TRUST_KEY_FILE: &str = "key.json";

/// Turns parsed global options into host, TLS and file locations
pub struct ArgProcessor {
    config_dir: PathBuf,
}

impl ArgProcessor {
    pub fn new(cli: &Cli) -> CliResult<Self> {
        let config_dir = ConfigManager::get_config_dir(cli.config.clone())?;
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn tls_enabled(&self, cli: &Cli) -> bool {
        cli.tls || cli.tlsverify
    }

    pub fn resolve_host(&self, cli: &Cli) -> CliResult<DaemonHost> {
        let host = DaemonHost::parse(cli.host.as_deref().unwrap_or_default(), self.tls_enabled(cli))?;
        debug!(%host, "daemon host resolved");
        Ok(host)
    }

    /// Certificates come from the explicit flags, else from
    /// `$BERTH_CERT_PATH`, else from the config directory. The CA is only
    /// loaded when verifying; a client identity is used when present.
    pub fn resolve_tls(&self, cli: &Cli) -> CliResult<Option<TlsConfig>> {
        if !self.tls_enabled(cli) {
            return Ok(None);
        }

        let cert_dir = std::env::var_os(CERT_PATH_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config_dir.clone());

        let ca = cli.tlscacert.clone().unwrap_or_else(|| cert_dir.join(CA_FILE));
        let cert = cli.tlscert.clone().unwrap_or_else(|| cert_dir.join(CERT_FILE));
        let key = cli.tlskey.clone().unwrap_or_else(|| cert_dir.join(KEY_FILE));

        let explicit_identity = cli.tlscert.is_some() || cli.tlskey.is_some();
        let identity = (explicit_identity || (cert.exists() && key.exists()))
            .then_some((cert.as_path(), key.as_path()));
        let ca = cli.tlsverify.then_some(ca.as_path());

        debug!(verify = cli.tlsverify, identity = identity.is_some(), "loading TLS material");
        TlsConfig::from_files(ca, identity, cli.tlsverify).map(Some)
    }

    /// Client trust key location
    pub fn key_file(&self) -> PathBuf {
        self.config_dir.join(TRUST_KEY_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Protocol;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_host_is_local_socket() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();
        let cli = parse(&["berth", "--config", dir, "-H", ""]);
        let processor = ArgProcessor::new(&cli).unwrap();

        let host = processor.resolve_host(&cli).unwrap();
        assert_eq!(host.protocol, Protocol::LocalSocket);
        assert!(processor.resolve_tls(&cli).unwrap().is_none());
        assert_eq!(processor.key_file(), temp_dir.path().join("key.json"));
    }

    #[test]
    fn test_tls_changes_default_port() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();
        let cli = parse(&["berth", "--config", dir, "--tls", "-H", "tcp://example.com"]);
        let processor = ArgProcessor::new(&cli).unwrap();

        assert_eq!(processor.resolve_host(&cli).unwrap().addr, "example.com:2376");
        let tls = processor.resolve_tls(&cli).unwrap().unwrap();
        assert!(!tls.verify);
        assert!(tls.ca_pem.is_none());
        assert!(tls.identity_pem.is_none());
    }

    #[test]
    fn test_tlsverify_reads_ca_from_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("ca.pem"), "CA").unwrap();
        std::fs::write(temp_dir.path().join("cert.pem"), "CERT\n").unwrap();
        std::fs::write(temp_dir.path().join("key.pem"), "KEY\n").unwrap();

        let ca = temp_dir.path().join("ca.pem");
        let dir = temp_dir.path().to_str().unwrap();
        let cli = parse(&[
            "berth",
            "--config",
            dir,
            "--tlsverify",
            "--tlscacert",
            ca.to_str().unwrap(),
            "--tlscert",
            temp_dir.path().join("cert.pem").to_str().unwrap(),
            "--tlskey",
            temp_dir.path().join("key.pem").to_str().unwrap(),
        ]);
        let processor = ArgProcessor::new(&cli).unwrap();

        let tls = processor.resolve_tls(&cli).unwrap().unwrap();
        assert!(tls.verify);
        assert_eq!(tls.ca_pem.as_deref(), Some(&b"CA"[..]));
        assert_eq!(tls.identity_pem.as_deref(), Some(&b"CERT\nKEY\n"[..]));
    }

    #[test]
    fn test_missing_explicit_cert_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();
        let cli = parse(&["berth", "--config", dir, "--tls", "--tlscert", "/nonexistent/cert.pem"]);
        let processor = ArgProcessor::new(&cli).unwrap();
        assert!(processor.resolve_tls(&cli).is_err());
    }
}
