//! REST binding for the uploads service.
//!
//! - `GET  {base}/files` lists every upload
//! - `POST {base}/files?filename=<name>` stores the raw request body
//! - `GET  {base}/files/{id}/content` downloads one upload

use async_trait::async_trait;
use url::Url;

use super::api::{Upload, UploadsApi, parse_listing};
use super::config::FlatConfig;
use crate::error::{Error, Result};
use crate::network::{HttpClient, Method, Response};

/// Uploads service client bound to one endpoint.
pub struct UploadClient {
    http: HttpClient,
    base: Url,
    token: Option<String>,
}

impl UploadClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    /// - `Permanent` if the endpoint is not a valid base URL
    pub fn new(config: &FlatConfig) -> Result<Self> {
        let base = Url::parse(&config.endpoint)
            .map_err(|e| Error::permanent(format!("invalid endpoint {}: {}", config.endpoint, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::permanent(format!(
                "invalid endpoint: {}",
                config.endpoint
            )));
        }
        Ok(Self {
            http: HttpClient::new(&config.http)?,
            base,
            token: config.token.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::permanent("endpoint cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: &Url, body: Option<Vec<u8>>) -> Result<Response> {
        let mut headers = Vec::new();
        if let Some(token) = &self.token {
            headers.push(("authorization", format!("Bearer {}", token)));
        }
        if body.is_some() {
            headers.push(("content-type", "application/octet-stream".to_string()));
        }
        self.http
            .request(method, url, body, &headers)
            .await?
            .error_for_status()
    }
}

#[async_trait]
impl UploadsApi for UploadClient {
    async fn list(&self) -> Result<Vec<Upload>> {
        let url = self.url(&["files"])?;
        let resp = self.send(Method::Get, &url, None).await?;
        parse_listing(&resp.body)
    }

    async fn upload(&self, filename: &str, content: &[u8]) -> Result<Upload> {
        let mut url = self.url(&["files"])?;
        url.query_pairs_mut().append_pair("filename", filename);
        let resp = self.send(Method::Post, &url, Some(content.to_vec())).await?;
        Ok(serde_json::from_slice(&resp.body)?)
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>> {
        let url = self.url(&["files", id, "content"])?;
        Ok(self.send(Method::Get, &url, None).await?.body)
    }
}
