//! Hierarchical backend: a Git repository addressed through the GitHub
//! contents API.
//!
//! - [`GitHubFs`]: the adapter, generic over a [`ContentsApi`]
//! - [`GitHubClient`]: the REST binding
//! - [`InMemoryRepo`]: a local repository with the same semantics

mod api;
mod client;
mod config;
mod fs;
mod memory;

pub use api::{ContentEntry, ContentFile, Contents, ContentsApi, EntryKind};
pub use client::GitHubClient;
pub use config::{API_VERSION, DEFAULT_API_URL, DEFAULT_MESSAGE_PREFIX, DEFAULT_PLACEHOLDER, GitHubConfig};
pub use fs::GitHubFs;
pub use memory::{InMemoryRepo, blob_sha};
