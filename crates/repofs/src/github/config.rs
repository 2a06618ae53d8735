//! Configuration for the GitHub contents backend.

use std::fmt;

use crate::error::{Error, Result};
use crate::network::HttpConfig;

/// Default REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default placeholder object written by `mkdir`.
pub const DEFAULT_PLACEHOLDER: &str = ".gitkeep";

/// Default prefix of generated commit messages.
pub const DEFAULT_MESSAGE_PREFIX: &str = "repofs";

/// REST API version header value.
pub const API_VERSION: &str = "2022-11-28";

/// GitHub backend configuration.
///
/// # Example
///
/// ```rust
/// use repofs::GitHubConfig;
///
/// let config = GitHubConfig::new("octocat/hello-world")
///     .unwrap()
///     .token("ghp_example")
///     .branch("main")
///     .committer("FTP Bridge", "ftp@example.com");
/// assert_eq!(config.owner(), "octocat");
/// assert_eq!(config.repo(), "hello-world");
/// ```
#[derive(Clone)]
pub struct GitHubConfig {
    pub(crate) owner: String,
    pub(crate) repo: String,
    pub(crate) token: Option<String>,
    pub(crate) branch: Option<String>,
    pub(crate) api_url: String,
    pub(crate) committer: Option<(String, String)>,
    pub(crate) message_prefix: String,
    pub(crate) placeholder: String,
    pub(crate) http: HttpConfig,
}

impl GitHubConfig {
    /// Create a configuration for an `owner/name` repository identifier.
    ///
    /// # Errors
    /// - `Permanent` if the identifier is not exactly two non-empty segments
    pub fn new(repository: &str) -> Result<Self> {
        let (owner, repo) = parse_repository(repository)?;
        Ok(Self {
            owner,
            repo,
            token: None,
            branch: None,
            api_url: DEFAULT_API_URL.to_string(),
            committer: None,
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            http: HttpConfig::default(),
        })
    }

    /// Set the access token sent as a bearer credential.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Operate on a branch other than the repository default.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Point at a different API root (GitHub Enterprise).
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Commit as this identity instead of the token owner.
    pub fn committer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.committer = Some((name.into(), email.into()));
        self
    }

    /// Set the prefix of generated commit messages.
    pub fn message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = prefix.into();
        self
    }

    /// Set the placeholder object name used to materialize directories.
    pub fn placeholder(mut self, name: impl Into<String>) -> Self {
        self.placeholder = name.into();
        self
    }

    /// Set transport settings.
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Branch, if one was set.
    pub fn branch_name(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Placeholder object name.
    pub fn placeholder_name(&self) -> &str {
        &self.placeholder
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .field("committer", &self.committer)
            .field("message_prefix", &self.message_prefix)
            .field("placeholder", &self.placeholder)
            .field("http", &self.http)
            .finish()
    }
}

fn parse_repository(repository: &str) -> Result<(String, String)> {
    let mut parts = repository.trim().trim_matches('/').split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::permanent(format!(
            "invalid repository identifier (expected owner/name): {}",
            repository
        ))),
    }
}
