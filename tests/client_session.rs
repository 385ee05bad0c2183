//! Library-level sessions against the fake daemon

mod common;

use berth::cli::handlers::default_registry;
use berth::transport::{DaemonRequest, Protocol};
use berth::{BufferStream, CliError, ClientContext};
use common::{refused_addr, FakeDaemon, Route, CONTAINERS_BODY, VERSION_BODY};

fn session(daemon: &FakeDaemon, out: BufferStream, err: BufferStream) -> ClientContext {
    ClientContext::builder(Protocol::LocalSocket, daemon.socket().to_string_lossy())
        .without_input()
        .output(out)
        .error(err)
        .registry(default_registry())
        .build()
        .unwrap()
}

fn args(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[tokio::test]
async fn test_transport_reuses_fixed_socket() {
    let daemon = FakeDaemon::start(vec![Route::new("/_ping", 200, "OK")]);
    let cli = session(&daemon, BufferStream::new(), BufferStream::new());

    // The local socket dialer ignores the address it is handed
    let dialer = cli.transport().local_dialer().unwrap();
    let connection = dialer.dial("tcp", "example.invalid:80").await;
    assert!(connection.is_ok());
    drop(connection);

    for _ in 0..2 {
        let response = cli.call(DaemonRequest::get("/_ping")).await.unwrap();
        assert_eq!(response.text(), "OK");
    }
}

#[tokio::test]
async fn test_local_socket_requests_identity_encoding() {
    let daemon = FakeDaemon::start(vec![Route::new("/_ping", 200, "OK")]);
    let cli = session(&daemon, BufferStream::new(), BufferStream::new());
    cli.call(DaemonRequest::get("/_ping")).await.unwrap();

    let head = daemon.requests().pop().unwrap().to_ascii_lowercase();
    assert!(head.contains("accept-encoding: identity"));
    assert!(head.contains("user-agent: berth/"));
}

#[tokio::test]
async fn test_version_session() {
    let daemon = FakeDaemon::start(vec![Route::new("/v1.0/version", 200, VERSION_BODY)]);
    let out = BufferStream::new();
    let mut cli = session(&daemon, out.clone(), BufferStream::new());

    cli.cmd(args(&["version"])).await.unwrap();
    assert!(out.contents().contains("Server API version: 1.0"));
}

#[tokio::test]
async fn test_container_list_session() {
    let daemon = FakeDaemon::start(vec![Route::new("/v1.0/containers/json", 200, CONTAINERS_BODY)]);
    let out = BufferStream::new();
    let mut cli = session(&daemon, out.clone(), BufferStream::new());

    cli.cmd(args(&["Container", "LIST", "--no-trunc", "-q"]))
        .await
        .unwrap();
    let ids: Vec<String> = out.contents().lines().map(str::to_string).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| id.len() == 64));
}

#[tokio::test]
async fn test_daemon_error_status() {
    let daemon = FakeDaemon::start(vec![Route::new("/_ping", 503, "daemon is shutting down")]);
    let mut cli = session(&daemon, BufferStream::new(), BufferStream::new());

    let err = cli.cmd(args(&["ping"])).await.unwrap_err();
    match err {
        CliError::HttpStatus {
            status_code,
            reason,
        } => {
            assert_eq!(status_code, 503);
            assert_eq!(reason, "daemon is shutting down");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_bad_flag_goes_to_error_stream() {
    let daemon = FakeDaemon::start(Vec::new());
    let out = BufferStream::new();
    let err = BufferStream::new();
    let mut cli = session(&daemon, out.clone(), err.clone());

    let result = cli.cmd(args(&["ps", "--bogus"])).await.unwrap_err();
    assert_eq!(result.exit_code(), 2);
    assert!(out.contents().is_empty());
    assert!(err.contents().contains("Usage: berth container list [OPTIONS]"));
    assert!(daemon.requests().is_empty());
}

fn network_session(addr: &str) -> ClientContext {
    ClientContext::builder(Protocol::Network, addr)
        .without_input()
        .output(BufferStream::new())
        .error(BufferStream::new())
        .registry(default_registry())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_network_requests_gzip_encoding() {
    let daemon = FakeDaemon::start_tcp(vec![Route::new("/_ping", 200, "OK")]);
    let cli = network_session(&daemon.addr());

    let response = cli.call(DaemonRequest::get("/_ping")).await.unwrap();
    assert_eq!(response.text(), "OK");

    let head = daemon.requests().pop().unwrap().to_ascii_lowercase();
    assert!(head.starts_with("get /_ping http/1.1"));
    assert!(head.contains("accept-encoding: gzip"));
    assert!(head.contains("user-agent: berth/"));
}

#[tokio::test]
async fn test_network_refused_port_is_connect_error() {
    let addr = refused_addr();
    let cli = network_session(&addr);

    let err = cli.call(DaemonRequest::get("/_ping")).await.unwrap_err();
    assert!(matches!(err, CliError::Connect { .. }), "unexpected error: {err}");
    assert!(err
        .to_string()
        .starts_with(&format!("Cannot connect to the berth daemon at {addr}")));
}
