//! HTTP transport shared by the remote backends.
//!
//! Every remote call goes through [`HttpClient::request`], which:
//!
//! - applies the configured connect and overall timeouts (a timeout is the
//!   only way a call is cut short; it surfaces as a transient failure)
//! - refuses redirects, so credentials are only ever sent to the configured host
//! - caps the response body at `max_response_bytes` while streaming it
//! - classifies non-2xx statuses via [`Response::error_for_status`]

use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};
use crate::logging_impl::LogConfig;

/// Default maximum response body size (100 MB)
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 100 * 1024 * 1024;

/// Default request timeout (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("repofs/", env!("CARGO_PKG_VERSION"));

/// Transport settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Overall request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Maximum response body size in bytes
    pub max_response_bytes: usize,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    /// Create transport settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum response body size.
    pub fn max_response_bytes(mut self, bytes: usize) -> Self {
        self.max_response_bytes = bytes;
        self
    }

    /// Set the User-Agent header value.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// HTTP response
#[derive(Debug)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lowercase names)
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

impl Response {
    /// Get the body as a UTF-8 string (lossy)
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Check if the response was successful (2xx status)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of a header, by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Pass a 2xx response through, classify anything else.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let rate_limited = self.header("x-ratelimit-remaining") == Some("0");
        Err(Error::from_status(
            self.status,
            rate_limited,
            &self.error_detail(),
        ))
    }

    /// Human-readable failure detail: the JSON `message` field when the
    /// backend sent one, else the start of the body. Echoed credentials are
    /// redacted since the detail ends up in user-facing errors.
    fn error_detail(&self) -> String {
        let redactor = LogConfig::default();
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&self.body) {
            if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
                return redactor.redact_value(msg).into_owned();
            }
        }
        let text = self.body_string();
        redactor.redact_value(text.trim()).into_owned()
    }
}

/// HTTP client used by the backend bindings.
pub struct HttpClient {
    client: Client,
    max_response_bytes: usize,
    #[cfg_attr(not(feature = "logging"), allow(dead_code))]
    log: LogConfig,
}

impl HttpClient {
    /// Create a client from transport settings.
    ///
    /// Installs the `ring` crypto provider for rustls if no provider is
    /// installed yet.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::permanent(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
            log: LogConfig::default(),
        })
    }

    /// Replace the redaction settings used when logging requests.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Get the maximum response size in bytes.
    pub fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }

    /// Make an HTTP request with custom headers.
    ///
    /// Transport failures (connect, timeout, interrupted body) are
    /// transient. Statuses are not checked here; call
    /// [`Response::error_for_status`].
    pub async fn request(
        &self,
        method: Method,
        url: &Url,
        body: Option<Vec<u8>>,
        headers: &[(&str, String)],
    ) -> Result<Response> {
        let mut request = self.client.request(method.as_reqwest(), url.as_str());

        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        if let Some(body_data) = body {
            request = request.body(body_data);
        }

        let response = request.send().await.map_err(|e| {
            log_debug!(
                method = method.as_str(),
                url = %self.log.redact_url(url.as_str()),
                error = %e,
                "remote call failed"
            );
            if e.is_timeout() {
                Error::transient("operation timed out")
            } else {
                Error::transient(format!("{} request failed: {}", method.as_str(), e))
            }
        })?;

        let status = response.status().as_u16();
        log_debug!(
            method = method.as_str(),
            url = %self.log.redact_url(url.as_str()),
            status,
            "remote call"
        );

        let resp_headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        // Check Content-Length header to fail fast on large responses
        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_bytes {
                return Err(Error::permanent(format!(
                    "response too large: {} bytes (max: {} bytes)",
                    content_length, self.max_response_bytes
                )));
            }
        }

        let body = self.read_body_with_limit(response).await?;

        Ok(Response {
            status,
            headers: resp_headers,
            body,
        })
    }

    /// Read response body with size limit enforcement.
    async fn read_body_with_limit(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        use futures_util::StreamExt;

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result
                .map_err(|e| Error::transient(format!("failed to read response chunk: {}", e)))?;

            if body.len() + chunk.len() > self.max_response_bytes {
                return Err(Error::permanent(format!(
                    "response too large: exceeded {} bytes limit",
                    self.max_response_bytes
                )));
            }

            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}
