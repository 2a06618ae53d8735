//! Configuration for the flat uploads backend.

use std::fmt;

use crate::network::HttpConfig;

/// Flat backend configuration.
///
/// ```rust
/// use repofs::FlatConfig;
///
/// let config = FlatConfig::new("https://uploads.example.com/api").token("secret");
/// assert_eq!(config.endpoint(), "https://uploads.example.com/api");
/// ```
#[derive(Clone)]
pub struct FlatConfig {
    pub(crate) endpoint: String,
    pub(crate) token: Option<String>,
    pub(crate) http: HttpConfig,
}

impl FlatConfig {
    /// Create a configuration for a base endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            http: HttpConfig::default(),
        }
    }

    /// Send a bearer credential with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set transport settings.
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Base endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for FlatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("http", &self.http)
            .finish()
    }
}
