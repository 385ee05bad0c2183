//! HTTP exchange with the daemon

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT_ENCODING, CONTENT_TYPE, HOST};
use hyper::Method;
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Compression, Connection};
use crate::errors::{CliError, CliResult};

/// Host header sent over local sockets, where there is no real host name
const LOCAL_HOST: &str = "berth";

/// One request to the daemon API
#[derive(Debug, Clone)]
pub struct DaemonRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl DaemonRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(body);
        request
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Request target, e.g. `/v1.0/containers/json?all=1`
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish();
        format!("{}?{}", self.path, query)
    }
}

/// Fully buffered daemon response
#[derive(Debug, Clone)]
pub struct DaemonResponse {
    pub status: u16,
    pub body: Bytes,
}

impl DaemonResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> CliResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP/1.1 exchange on a freshly dialed connection
pub(crate) async fn send_over_connection(
    connection: Connection,
    request: DaemonRequest,
    compression: Compression,
) -> CliResult<DaemonResponse> {
    let target = request.path_and_query();
    let method = request.method.to_string();
    let request_error = |e: Box<dyn std::error::Error + Send + Sync>| CliError::HttpRequest {
        method: method.clone(),
        url: target.clone(),
        source: Some(e),
    };

    let (mut sender, driver) =
        hyper::client::conn::http1::handshake::<_, Full<Bytes>>(TokioIo::new(connection))
            .await
            .map_err(|e| request_error(Box::new(e)))?;

    tokio::spawn(async move {
        if let Err(err) = driver.await {
            debug!(error = %err, "daemon connection closed with error");
        }
    });

    let mut builder = hyper::Request::builder()
        .method(request.method.clone())
        .uri(target.as_str())
        .header(HOST, LOCAL_HOST);

    if compression == Compression::Disabled {
        builder = builder.header(ACCEPT_ENCODING, "identity");
    }

    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let body = match &request.body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Bytes::from(serde_json::to_vec(value)?)
        }
        None => Bytes::new(),
    };

    let http_request = builder
        .body(Full::new(body))
        .map_err(|e| request_error(Box::new(e)))?;

    let response = sender
        .send_request(http_request)
        .await
        .map_err(|e| request_error(Box::new(e)))?;
    let status = response.status().as_u16();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| request_error(Box::new(e)))?
        .to_bytes();

    Ok(DaemonResponse { status, body })
}

/// Exchange through the pooled network client
pub(crate) async fn send_pooled(
    client: &reqwest::Client,
    scheme: &str,
    addr: &str,
    request: DaemonRequest,
) -> CliResult<DaemonResponse> {
    let url = format!("{scheme}://{addr}{}", request.path_and_query());
    let mut builder = client.request(request.method.clone(), &url);

    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    if let Some(body) = &request.body {
        builder = builder.json(body);
    }

    let response = builder.send().await.map_err(|e| {
        if e.is_connect() && e.is_timeout() {
            CliError::DialTimeout {
                addr: addr.to_string(),
                timeout_secs: super::DIAL_TIMEOUT.as_secs(),
            }
        } else if e.is_connect() {
            CliError::Connect {
                addr: addr.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e),
            }
        } else {
            CliError::http_request(request.method.as_str(), url.as_str(), e)
        }
    })?;

    let status = response.status().as_u16();
    let body = response.bytes().await?;
    Ok(DaemonResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_query_encoding() {
        let request = DaemonRequest::get("/v1.0/containers/json")
            .query("all", "1")
            .query("filters", "{\"status\":[\"running\"]}");
        assert_eq!(
            request.path_and_query(),
            "/v1.0/containers/json?all=1&filters=%7B%22status%22%3A%5B%22running%22%5D%7D"
        );
    }

    #[test]
    fn test_plain_path_without_query() {
        assert_eq!(DaemonRequest::get("/_ping").path_and_query(), "/_ping");
    }

    #[test]
    fn test_response_helpers() {
        let response = DaemonResponse {
            status: 200,
            body: Bytes::from_static(br#"{"Version":"1.2.3"}"#),
        };
        assert!(response.is_success());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["Version"], "1.2.3");

        let missing = DaemonResponse {
            status: 404,
            body: Bytes::from_static(b"no such container"),
        };
        assert!(!missing.is_success());
        assert_eq!(missing.text(), "no such container");
    }
}
