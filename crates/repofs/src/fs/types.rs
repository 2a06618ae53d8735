//! Attribute records returned to the protocol front end.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

use crate::path;

/// Synthetic owner label; the backends have no ownership model.
pub const OWNER: &str = "repofs";

/// Synthetic group label.
pub const GROUP: &str = "repofs";

/// Permission bits reported for files.
pub const FILE_MODE: u32 = 0o644;

/// Permission bits reported for directories.
pub const DIR_MODE: u32 = 0o755;

/// File type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Regular file
    File,
    /// Directory (synthesized, never stored)
    Directory,
}

impl FileType {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// Attribute record for one virtual path.
///
/// Owned by the caller once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    /// File or directory
    pub kind: FileType,
    /// Owner label (fixed)
    pub owner: String,
    /// Group label (fixed)
    pub group: String,
    /// Unix permission bits (fixed per kind)
    pub mode: u32,
    /// Link count (fixed per kind)
    pub nlink: u32,
    /// Backend timestamp when available, else the query time
    pub mtime: SystemTime,
    /// Size in bytes, 0 for directories
    pub size: u64,
    /// Path without the leading separator
    pub path: String,
}

impl FileInfo {
    /// Attributes for a file.
    pub fn file(path: impl Into<String>, size: u64, mtime: SystemTime) -> Self {
        Self {
            kind: FileType::File,
            owner: OWNER.to_string(),
            group: GROUP.to_string(),
            mode: FILE_MODE,
            nlink: 1,
            mtime,
            size,
            path: path.into(),
        }
    }

    /// Attributes for a synthesized directory.
    ///
    /// Directories have no backend timestamp; the Unix epoch is reported.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            kind: FileType::Directory,
            owner: OWNER.to_string(),
            group: GROUP.to_string(),
            mode: DIR_MODE,
            nlink: 2,
            mtime: SystemTime::UNIX_EPOCH,
            size: 0,
            path: path.into(),
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Last path component, used as the display name.
    pub fn name(&self) -> &str {
        path::file_name(&self.path)
    }

    /// Render an `ls -l` style line for a listing reply.
    ///
    /// ```
    /// use repofs::FileInfo;
    ///
    /// let line = FileInfo::directory("docs").ls_line();
    /// assert_eq!(line, "drwxr-xr-x 2 repofs repofs 0 Jan 01 00:00 docs");
    /// ```
    pub fn ls_line(&self) -> String {
        let mtime: DateTime<Utc> = self.mtime.into();
        format!(
            "{}{} {} {} {} {} {} {}",
            if self.is_dir() { 'd' } else { '-' },
            mode_string(self.mode),
            self.nlink,
            self.owner,
            self.group,
            self.size,
            mtime.format("%b %d %H:%M"),
            self.name()
        )
    }
}

fn mode_string(mode: u32) -> String {
    let mut s = String::with_capacity(9);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    s
}
