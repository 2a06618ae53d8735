//! Flat adapter over an upload list.
//!
//! The store has no directories and no way to replace or remove an upload.
//! Every upload is a file named by the path it was written to. Writing the
//! same path twice stores a second upload with the same name; lookups by
//! path resolve to the most recent one.

use async_trait::async_trait;
use std::time::SystemTime;
use tokio::io::AsyncRead;

use super::api::{Upload, UploadsApi};
use super::client::UploadClient;
use super::config::FlatConfig;
use crate::error::{FsError, FsResult, NotFoundExt, Result, catalog};
use crate::fs::{Content, FileInfo, FileSystem, Lister, Prober, Reader, Writer, drain};
use crate::path::{self, GlobPattern};

/// File system backed by an upload list.
///
/// ```rust
/// use repofs::{FlatFs, InMemoryUploads, Lister, Writer};
///
/// # tokio_test::block_on(async {
/// let fs = FlatFs::new(InMemoryUploads::new());
/// let mut upload: &[u8] = b"v1";
/// fs.write("/build.log", &mut upload).await?;
///
/// assert_eq!(fs.dir("/*").await?, vec!["/build.log"]);
/// # Ok::<(), repofs::FsError>(())
/// # }).unwrap();
/// ```
pub struct FlatFs<U: UploadsApi = UploadClient> {
    api: U,
}

impl FlatFs<UploadClient> {
    /// Bind to the endpoint described by `config`.
    pub fn from_config(config: &FlatConfig) -> Result<Self> {
        Ok(Self::new(UploadClient::new(config)?))
    }
}

impl<U: UploadsApi> FlatFs<U> {
    /// Wrap an API handle.
    pub fn new(api: U) -> Self {
        Self { api }
    }

    /// The underlying API handle.
    pub fn api(&self) -> &U {
        &self.api
    }

    /// Upload named `key` that the caller expects to exist.
    async fn require(&self, key: &str) -> FsResult<Upload> {
        let uploads = self.api.list().await.map_err(|e| e.at(key))?;
        latest(uploads, key).ok_or_else(|| FsError::permanent(catalog::no_such_file(key)))
    }
}

/// Most recent upload named `key`.
fn latest(uploads: Vec<Upload>, key: &str) -> Option<Upload> {
    uploads.into_iter().rev().find(|u| u.filename == key)
}

#[async_trait]
impl<U: UploadsApi> Prober for FlatFs<U> {
    async fn exists(&self, path: &str) -> FsResult<bool> {
        let Some(uploads) = self.api.list().await.found()? else {
            return Ok(false);
        };
        Ok(latest(uploads, &path::object_key(path)).is_some())
    }

    async fn is_directory(&self, _path: &str) -> FsResult<bool> {
        Ok(false)
    }

    async fn file_info(&self, path: &str) -> FsResult<FileInfo> {
        let key = path::object_key(path);
        let upload = self.require(&key).await?;
        let mtime = upload
            .created_at
            .map(SystemTime::from)
            .unwrap_or_else(SystemTime::now);
        Ok(FileInfo::file(key, upload.size, mtime))
    }
}

#[async_trait]
impl<U: UploadsApi> Reader for FlatFs<U> {
    async fn read(&self, path: &str) -> FsResult<Content> {
        let key = path::object_key(path);
        let upload = self.require(&key).await?;
        let bytes = self.api.download(&upload.id).await.map_err(|e| e.at(&key))?;
        Ok(Content::new(bytes))
    }
}

#[async_trait]
impl<U: UploadsApi> Writer for FlatFs<U> {
    async fn write(&self, path: &str, data: &mut (dyn AsyncRead + Unpin + Send)) -> FsResult<()> {
        let bytes = drain(data).await?;
        let key = path::object_key(path);
        self.api.upload(&key, &bytes).await.map_err(|e| e.at(&key))?;
        log_trace!(
            path = %crate::logging_impl::sanitize_for_log(&key),
            size = bytes.len(),
            "stored upload"
        );
        Ok(())
    }
}

#[async_trait]
impl<U: UploadsApi> Lister for FlatFs<U> {
    async fn dir(&self, path: &str) -> FsResult<Vec<String>> {
        let pattern = GlobPattern::parse(path);
        let uploads = self.api.list().await.found()?.unwrap_or_default();
        // Names are flat; a separator only counts as nesting for globbing.
        let matched: Vec<String> = uploads
            .iter()
            .filter(|u| pattern.matches_immediate(&u.filename))
            .map(|u| path::qualify(&u.filename))
            .collect();

        if pattern.is_wildcard() {
            return Ok(matched);
        }
        // A plain path names one object even if it was uploaded repeatedly.
        Ok(matched.into_iter().take(1).collect())
    }
}

impl<U: UploadsApi> FileSystem for FlatFs<U> {
    fn as_writer(&self) -> Option<&dyn Writer> {
        Some(self)
    }
}
