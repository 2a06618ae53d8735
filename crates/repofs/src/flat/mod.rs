//! Flat backend: an upload service with a single listing and no hierarchy.
//!
//! Supports probe, read, write, and list. Delete, directories, and rename
//! are absent; [`FlatFs`] reports them as unavailable through
//! [`FileSystem`](crate::FileSystem).

mod api;
mod client;
mod config;
mod fs;
mod memory;

pub use api::{Upload, UploadsApi};
pub use client::UploadClient;
pub use config::FlatConfig;
pub use fs::FlatFs;
pub use memory::InMemoryUploads;
