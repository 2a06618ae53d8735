//! File-system surface for the protocol front end
//!
//! Provides the capability traits every backend implements and the pieces
//! they share:
//! - `Prober`, `Reader`, `Writer`, `Lister`, `Deleter`, `DirectoryOps`, `Renamer`
//! - `FileSystem`: mandatory capabilities plus discovery of optional ones
//! - `FileInfo`: synthetic attribute records
//! - `Content`: in-memory, seekable object content
//! - `rename_via_copy`: the non-atomic move used by mutable backends

mod content;
mod rename;
mod traits;
mod types;

pub(crate) use content::drain;
pub use content::Content;
pub use rename::rename_via_copy;
pub use traits::{
    Capabilities, Deleter, DirectoryOps, FileSystem, Lister, Prober, Reader, Renamer, Writer,
};
pub use types::{DIR_MODE, FILE_MODE, FileInfo, FileType, GROUP, OWNER};
