//! Transport to the remote-control server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use thiserror::Error;

/// Path of the command endpoint on the remote server.
pub const DRIVER_PATH: &str = "/selenium-server/driver/";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

#[derive(Debug, Error)]
/// Failures reaching the remote server. Server-side errors inside a 2xx
/// response body are not transport errors.
pub enum TransportError {
    #[error("invalid remote driver configuration: {0}")]
    InvalidConfig(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote server returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("remote server unavailable: {0}")]
    Unavailable(String),
}

/// Posts command bodies to a remote-control server and returns its text reply.
#[async_trait]
pub trait RemoteDriver: Send + Sync {
    async fn post(&self, body: &str) -> Result<String, TransportError>;

    /// Link to the server's record of a session, when the server offers one.
    fn result_url(&self, session_id: &str) -> Option<String> {
        let _ = session_id;
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRemoteDriverConfig {
    /// `host:port` of the remote server.
    pub host_port: String,
    pub request_timeout_ms: u64,
    /// Base URL of per-session result pages; `<base>/<session id>`.
    pub result_url_base: Option<String>,
}

impl Default for HttpRemoteDriverConfig {
    fn default() -> Self {
        Self {
            host_port: "localhost:4444".to_string(),
            request_timeout_ms: 30_000,
            result_url_base: None,
        }
    }
}

impl HttpRemoteDriverConfig {
    pub fn validate(&self) -> Result<(), TransportError> {
        let host_port = self.host_port.trim();
        if host_port.is_empty() {
            return Err(TransportError::InvalidConfig(
                "host:port cannot be empty".to_string(),
            ));
        }
        if host_port.contains("://") {
            return Err(TransportError::InvalidConfig(format!(
                "host:port must not include a scheme: '{host_port}'"
            )));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> String {
        format!(
            "http://{}{DRIVER_PATH}",
            self.host_port.trim().trim_end_matches('/')
        )
    }
}

#[derive(Debug, Clone)]
/// `RemoteDriver` speaking HTTP POST to `http://<host:port>/selenium-server/driver/`.
pub struct HttpRemoteDriver {
    http: reqwest::Client,
    endpoint: String,
    result_url_base: Option<String>,
}

impl HttpRemoteDriver {
    pub fn new(config: HttpRemoteDriverConfig) -> Result<Self, TransportError> {
        config.validate()?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint(),
            result_url_base: config
                .result_url_base
                .map(|base| base.trim().trim_end_matches('/').to_string())
                .filter(|base| !base.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteDriver for HttpRemoteDriver {
    async fn post(&self, body: &str) -> Result<String, TransportError> {
        tracing::debug!(endpoint = self.endpoint.as_str(), body, "posting remote command");
        let response = self
            .http
            .post(&self.endpoint)
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    fn result_url(&self, session_id: &str) -> Option<String> {
        self.result_url_base
            .as_ref()
            .map(|base| format!("{base}/{session_id}"))
    }
}
