//! Uploads API contract and wire format.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Upload {
    /// Backend identifier, used for downloads
    pub id: String,
    /// Name given at upload time; not unique
    pub filename: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Upload time, when reported
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Operations the flat backend needs from the remote store.
#[async_trait]
pub trait UploadsApi: Send + Sync {
    /// Every stored object, in backend order.
    async fn list(&self) -> Result<Vec<Upload>>;

    /// Store a new object. Never replaces an existing one.
    async fn upload(&self, filename: &str, content: &[u8]) -> Result<Upload>;

    /// Content of the object with `id`.
    ///
    /// # Errors
    /// - `NotFound` if no such object exists
    async fn download(&self, id: &str) -> Result<Vec<u8>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Bare(Vec<Upload>),
    Wrapped { files: Vec<Upload> },
}

/// Parse a listing body: a bare array or `{"files": [...]}`.
pub(crate) fn parse_listing(body: &[u8]) -> Result<Vec<Upload>> {
    Ok(match serde_json::from_slice::<Listing>(body)? {
        Listing::Bare(uploads) | Listing::Wrapped { files: uploads } => uploads,
    })
}
