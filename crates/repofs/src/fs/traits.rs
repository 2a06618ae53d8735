//! Capability traits consumed by the protocol front end.
//!
//! A backend implements the capabilities it can honor. [`FileSystem`]
//! bundles the mandatory ones and exposes the optional ones as
//! `Option<&dyn ...>`, so a front end can check once at construction which
//! commands to enable instead of probing for methods per command.
//!
//! All paths are virtual paths as the front end received them; every
//! implementation normalizes them before touching the backend.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::content::Content;
use super::types::FileInfo;
use crate::error::FsResult;

/// Existence, type, and attribute queries.
///
/// Not-found never surfaces from `exists` or `is_directory`; it resolves to
/// `false`. These calls are safe to retry.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Access check hook. The adapter enforces no access control beyond
    /// what the front end already constrains, so this is always true.
    fn accessible(&self, _path: &str) -> bool {
        true
    }

    /// Check if an object (file or directory) exists at `path`.
    async fn exists(&self, path: &str) -> FsResult<bool>;

    /// Check if `path` is a directory.
    async fn is_directory(&self, path: &str) -> FsResult<bool>;

    /// Attribute record for `path`.
    ///
    /// # Errors
    /// - `Permanent` if the path does not exist
    async fn file_info(&self, path: &str) -> FsResult<FileInfo>;
}

/// Whole-object reads.
#[async_trait]
pub trait Reader: Send + Sync {
    /// Fetch the full content at `path`.
    ///
    /// # Errors
    /// - `Permanent` if the path does not exist or is a directory
    async fn read(&self, path: &str) -> FsResult<Content>;
}

/// Whole-object writes with create-vs-update selection.
#[async_trait]
pub trait Writer: Send + Sync {
    /// Drain `data` and store it at `path`.
    ///
    /// Not atomic with respect to other writers of the same path: a
    /// concurrent change between the existence check and the mutation
    /// surfaces as a `Permanent` conflict. Never retried internally.
    async fn write(&self, path: &str, data: &mut (dyn AsyncRead + Unpin + Send)) -> FsResult<()>;
}

/// Listing with glob expansion.
#[async_trait]
pub trait Lister: Send + Sync {
    /// Expand `path` into fully-qualified virtual paths.
    ///
    /// - No wildcard, existing object: `[path]`
    /// - Trailing wildcard: every immediate entry whose path starts with the
    ///   text before the wildcard, each with a leading separator
    ///
    /// Order is backend listing order.
    async fn dir(&self, path: &str) -> FsResult<Vec<String>>;
}

/// File removal.
#[async_trait]
pub trait Deleter: Send + Sync {
    /// Delete the file at `path`.
    ///
    /// # Errors
    /// - `Permanent` if the path does not exist or is a directory
    async fn delete(&self, path: &str) -> FsResult<()>;
}

/// Directory emulation.
#[async_trait]
pub trait DirectoryOps: Send + Sync {
    /// Make `path` observable as a directory.
    async fn mkdir(&self, path: &str) -> FsResult<()>;

    /// Remove the objects that make `path` a directory.
    async fn rmdir(&self, path: &str) -> FsResult<()>;
}

/// Moves.
#[async_trait]
pub trait Renamer: Send + Sync {
    /// Move the file at `from` to `to`.
    ///
    /// Not atomic; see [`super::rename_via_copy`].
    async fn rename(&self, from: &str, to: &str) -> FsResult<()>;
}

/// Optional capabilities a backend offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// STOR and friends
    pub write: bool,
    /// DELE
    pub delete: bool,
    /// MKD / RMD
    pub directories: bool,
    /// RNFR / RNTO
    pub rename: bool,
}

impl Capabilities {
    /// Every capability present.
    pub fn all() -> Self {
        Self {
            write: true,
            delete: true,
            directories: true,
            rename: true,
        }
    }

    /// Probe, read, and list only.
    pub fn read_only() -> Self {
        Self::default()
    }
}

/// A complete adapter: mandatory capabilities plus discoverable optional ones.
pub trait FileSystem: Prober + Reader + Lister {
    /// Writer capability, if supported.
    fn as_writer(&self) -> Option<&dyn Writer> {
        None
    }

    /// Deleter capability, if supported.
    fn as_deleter(&self) -> Option<&dyn Deleter> {
        None
    }

    /// Directory capability, if supported.
    fn as_directories(&self) -> Option<&dyn DirectoryOps> {
        None
    }

    /// Renamer capability, if supported.
    fn as_renamer(&self) -> Option<&dyn Renamer> {
        None
    }

    /// Summary of the optional capabilities.
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            write: self.as_writer().is_some(),
            delete: self.as_deleter().is_some(),
            directories: self.as_directories().is_some(),
            rename: self.as_renamer().is_some(),
        }
    }
}
