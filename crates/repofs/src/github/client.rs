//! REST binding for the GitHub contents API.
//!
//! - `GET    /repos/{owner}/{repo}/contents/{path}[?ref=branch]`
//! - `PUT    /repos/{owner}/{repo}/contents/{path}` (create, or update with `sha`)
//! - `DELETE /repos/{owner}/{repo}/contents/{path}` (with `sha`)

use async_trait::async_trait;
use url::Url;

use super::api::{
    Committer, ContentFile, Contents, ContentsApi, DeleteBody, Parsed, PutBody, check_segments,
    encode_base64, parse_contents,
};
use super::config::{API_VERSION, GitHubConfig};
use crate::error::{Error, Result};
use crate::network::{HttpClient, Method, Response};

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Contents API client bound to one repository and credential.
pub struct GitHubClient {
    http: HttpClient,
    contents_url: Url,
    token: Option<String>,
    branch: Option<String>,
    committer: Option<Committer>,
}

impl GitHubClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    /// - `Permanent` if the API URL is invalid or the HTTP client cannot be built
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let contents_url = contents_root(&config.api_url, &config.owner, &config.repo)?;
        Ok(Self {
            http: HttpClient::new(&config.http)?,
            contents_url,
            token: config.token.clone(),
            branch: config.branch.clone(),
            committer: config
                .committer
                .as_ref()
                .map(|(name, email)| Committer {
                    name: name.clone(),
                    email: email.clone(),
                }),
        })
    }

    /// URL of a path under the contents root.
    fn url(&self, path: &str) -> Result<Url> {
        check_segments(path)?;
        let mut url = self.contents_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::permanent("API URL cannot be a base"))?
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// URL for a lookup, pinned to the configured branch.
    fn lookup_url(&self, path: &str) -> Result<Url> {
        let mut url = self.url(path)?;
        if let Some(branch) = &self.branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }
        Ok(url)
    }

    fn headers(&self, accept: &str) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("accept", accept.to_string()),
            ("x-github-api-version", API_VERSION.to_string()),
        ];
        if let Some(token) = &self.token {
            headers.push(("authorization", format!("Bearer {}", token)));
        }
        headers
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<Vec<u8>>,
        accept: &str,
    ) -> Result<Response> {
        let mut headers = self.headers(accept);
        if body.is_some() {
            headers.push(("content-type", "application/json".to_string()));
        }
        self.http
            .request(method, url, body, &headers)
            .await?
            .error_for_status()
    }

    async fn put(&self, path: &str, content: &[u8], sha: Option<&str>, message: &str) -> Result<()> {
        let body = PutBody {
            message,
            content: encode_base64(content),
            sha,
            branch: self.branch.as_deref(),
            committer: self.committer.as_ref(),
        };
        let url = self.url(path)?;
        self.send(Method::Put, &url, Some(serde_json::to_vec(&body)?), JSON_MEDIA_TYPE)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ContentsApi for GitHubClient {
    async fn get(&self, path: &str) -> Result<Contents> {
        let url = self.lookup_url(path)?;
        let resp = self.send(Method::Get, &url, None, JSON_MEDIA_TYPE).await?;
        match parse_contents(&resp.body)? {
            Parsed::Ready(contents) => Ok(contents),
            Parsed::NeedsRaw { path, sha, size } => {
                let raw = self.send(Method::Get, &url, None, RAW_MEDIA_TYPE).await?;
                Ok(Contents::File(ContentFile {
                    path,
                    sha,
                    size,
                    content: raw.body,
                }))
            }
        }
    }

    async fn create(&self, path: &str, content: &[u8], message: &str) -> Result<()> {
        self.put(path, content, None, message).await
    }

    async fn update(&self, path: &str, content: &[u8], sha: &str, message: &str) -> Result<()> {
        self.put(path, content, Some(sha), message).await
    }

    async fn delete(&self, path: &str, sha: &str, message: &str) -> Result<()> {
        let body = DeleteBody {
            message,
            sha,
            branch: self.branch.as_deref(),
            committer: self.committer.as_ref(),
        };
        let url = self.url(path)?;
        self.send(
            Method::Delete,
            &url,
            Some(serde_json::to_vec(&body)?),
            JSON_MEDIA_TYPE,
        )
        .await?;
        Ok(())
    }
}

fn contents_root(api_url: &str, owner: &str, repo: &str) -> Result<Url> {
    let mut url = Url::parse(api_url)
        .map_err(|e| Error::permanent(format!("invalid API URL {}: {}", api_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::permanent(format!("invalid API URL: {}", api_url)))?
        .pop_if_empty()
        .extend(["repos", owner, repo, "contents"]);
    Ok(url)
}
