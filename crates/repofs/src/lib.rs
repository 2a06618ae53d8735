//! Repofs - File-system semantics over remote content stores
//!
//! Exposes a remote store that has no real directories as the hierarchical
//! file system a file-transfer protocol server expects. Two backends share
//! one contract:
//!
//! - [`GitHubFs`]: a Git repository through the GitHub contents API, with
//!   emulated directories, hash-checked updates, and rename
//! - [`FlatFs`]: an upload service with a single flat listing
//!
//! Every operation returns [`FsResult`]; a failure is either
//! [`FsError::Permanent`] or [`FsError::Transient`], and the protocol server
//! decides the reply code.
//!
//! # Example
//!
//! ```rust
//! use repofs::{DirectoryOps, FileSystem, GitHubFs, InMemoryRepo, Lister, Prober, Writer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> repofs::FsResult<()> {
//!     let fs = GitHubFs::new(InMemoryRepo::new());
//!
//!     fs.mkdir("/reports").await?;
//!     let mut upload: &[u8] = b"q1 totals";
//!     fs.write("/reports/q1.txt", &mut upload).await?;
//!
//!     assert!(fs.is_directory("/reports").await?);
//!     assert_eq!(
//!         fs.dir("/reports/*").await?,
//!         vec!["/reports/.gitkeep", "/reports/q1.txt"]
//!     );
//!     assert!(fs.capabilities().rename);
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! Enable the `logging` feature to emit `tracing` events for remote calls,
//! create-vs-update decisions, and partially applied renames.

// Stay first: the logging macros must be defined before the modules using them.
#[macro_use]
mod logging_impl;

mod error;
mod flat;
mod fs;
mod github;
mod network;
pub mod path;

pub use async_trait::async_trait;
pub use error::{Error, FsError, FsResult, Result, catalog};
pub use flat::{FlatConfig, FlatFs, InMemoryUploads, Upload, UploadClient, UploadsApi};
pub use fs::{
    Capabilities, Content, DIR_MODE, Deleter, DirectoryOps, FILE_MODE, FileInfo, FileSystem,
    FileType, GROUP, Lister, OWNER, Prober, Reader, Renamer, Writer, rename_via_copy,
};
pub use github::{
    API_VERSION, ContentEntry, ContentFile, Contents, ContentsApi, DEFAULT_API_URL,
    DEFAULT_MESSAGE_PREFIX, DEFAULT_PLACEHOLDER, EntryKind, GitHubClient, GitHubConfig, GitHubFs,
    InMemoryRepo, blob_sha,
};
pub use logging_impl::{LogConfig, sanitize_for_log};
pub use network::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, HttpClient, HttpConfig, Method, Response,
};
