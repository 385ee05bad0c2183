//! Common test utilities and helpers
//!
//! This module provides the command builder used by the binary tests and a
//! fake daemon that answers canned HTTP responses on a Unix socket or a
//! loopback TCP port.
#![allow(dead_code)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

/// Test command builder for the berth binary
pub struct TestCommand {
    cmd: Command,
}

impl TestCommand {
    /// Create a command isolated from the caller's environment
    pub fn new(config_dir: &Path) -> Self {
        let mut cmd = Command::cargo_bin("berth").expect("Failed to find berth binary");
        cmd.env_remove("BERTH_HOST")
            .env_remove("BERTH_TLS_VERIFY")
            .env_remove("BERTH_CERT_PATH")
            .env("BERTH_CONFIG", config_dir);
        Self { cmd }
    }

    /// Add arguments to the command
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.cmd.arg(arg.as_ref());
        }
        self
    }

    /// Point the client at a daemon host
    pub fn host<S: AsRef<str>>(mut self, host: S) -> Self {
        self.cmd.arg("-H").arg(host.as_ref());
        self
    }

    /// Execute and return the assertion
    pub fn assert(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert()
    }

    /// Execute and expect success
    pub fn expect_success(self) -> TestAssertion {
        TestAssertion {
            assert: self.assert().success(),
        }
    }

    /// Execute and expect the given exit status
    pub fn expect_code(self, code: i32) -> TestAssertion {
        TestAssertion {
            assert: self.assert().code(code),
        }
    }
}

/// Test assertion wrapper with convenient methods
pub struct TestAssertion {
    assert: assert_cmd::assert::Assert,
}

impl TestAssertion {
    /// Assert stdout contains text
    pub fn stdout_contains<S: AsRef<str>>(self, text: S) -> Self {
        let assert = self.assert.stdout(predicate::str::contains(text.as_ref()));
        Self { assert }
    }

    /// Assert stderr contains text
    pub fn stderr_contains<S: AsRef<str>>(self, text: S) -> Self {
        let assert = self.assert.stderr(predicate::str::contains(text.as_ref()));
        Self { assert }
    }

    /// Assert multiple stdout patterns
    pub fn stdout_contains_all<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.assert = self.assert.stdout(predicate::str::contains(pattern.as_ref()));
        }
        self
    }

    /// Finish the assertion
    pub fn done(self) -> assert_cmd::assert::Assert {
        self.assert
    }
}

/// Temporary config directory for one test
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self { temp_dir }
    }

    pub fn config_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `config.toml` into the config directory
    pub fn write_config(&self, content: &str) {
        std::fs::write(self.config_dir().join("config.toml"), content)
            .expect("Failed to write config");
    }

    /// Create a command configured for this environment
    pub fn command(&self) -> TestCommand {
        TestCommand::new(self.config_dir())
    }

    /// Host string for a socket that nothing listens on
    pub fn unreachable_host(&self) -> String {
        format!("unix://{}", self.config_dir().join("missing.sock").display())
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// One canned daemon answer, chosen by request path prefix
#[derive(Clone)]
pub struct Route {
    pub prefix: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn new(prefix: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self {
            prefix,
            status,
            body: body.into(),
        }
    }
}

/// Minimal HTTP/1.1 daemon on a Unix socket or a loopback TCP port. Every
/// request head it receives is recorded for later inspection.
pub struct FakeDaemon {
    socket: PathBuf,
    tcp_addr: Option<SocketAddr>,
    requests: Arc<Mutex<Vec<String>>>,
    _dir: TempDir,
}

impl FakeDaemon {
    pub fn start(routes: Vec<Route>) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let socket = dir.path().join("berth.sock");
        let listener = UnixListener::bind(&socket).expect("Failed to bind fake daemon");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let Ok(reader) = stream.try_clone() else { break };
                answer(BufReader::new(reader), stream, &routes, &recorded);
            }
        });

        Self {
            socket,
            tcp_addr: None,
            requests,
            _dir: dir,
        }
    }

    /// Listen on an ephemeral loopback port instead of a Unix socket
    pub fn start_tcp(routes: Vec<Route>) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fake daemon");
        let tcp_addr = listener.local_addr().expect("Failed to read local address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let Ok(reader) = stream.try_clone() else { break };
                answer(BufReader::new(reader), stream, &routes, &recorded);
            }
        });

        Self {
            socket: dir.path().join("unused.sock"),
            tcp_addr: Some(tcp_addr),
            requests,
            _dir: dir,
        }
    }

    pub fn host(&self) -> String {
        match self.tcp_addr {
            Some(addr) => format!("tcp://{addr}"),
            None => format!("unix://{}", self.socket.display()),
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// `host:port` of a TCP daemon
    pub fn addr(&self) -> String {
        self.tcp_addr
            .map(|addr| addr.to_string())
            .expect("not a TCP daemon")
    }

    /// Request heads received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Read one request head and write the matching canned response
fn answer(
    mut reader: impl BufRead,
    mut writer: impl Write,
    routes: &[Route],
    recorded: &Mutex<Vec<String>>,
) {
    let mut head = String::new();
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) if line == "\r\n" => break,
            Ok(_) => head.push_str(&line),
        }
    }

    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    recorded.lock().unwrap().push(head);

    let (status, body) = routes
        .iter()
        .find(|route| path.starts_with(route.prefix))
        .map(|route| (route.status, route.body.clone()))
        .unwrap_or((404, r#"{"message":"page not found"}"#.to_string()));
    let response = format!(
        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = writer.write_all(response.as_bytes());
}

/// A loopback address that refuses connections
pub fn refused_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    addr.to_string()
}

pub const VERSION_BODY: &str =
    r#"{"Version":"9.9.9","ApiVersion":"1.0","Os":"linux","Arch":"amd64"}"#;

pub const CONTAINERS_BODY: &str = r#"[
    {"Id":"4c01db0b339c6d7a2f3c1c7c2f8c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e","Image":"nginx:latest","Command":"nginx -g 'daemon off;'","Status":"Up 2 hours","Names":["/web"]},
    {"Id":"9f1e2d3c4b5a69788796a5b4c3d2e1f00112233445566778899aabbccddeeff0","Image":"redis:7","Command":"redis-server","Status":"Up 5 minutes","Names":["/cache"]}
]"#;
