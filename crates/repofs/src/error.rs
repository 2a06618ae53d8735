//! Error types for Repofs
//!
//! Two layers of errors, with the following design goals:
//! - Backend calls report one of three conditions: not-found, transient, permanent
//! - Nothing but permanent or transient failures leaves the adapter surface
//! - Human-readable messages, with credentials never included

use thiserror::Error;

/// Result type alias for backend calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for adapter operations.
pub type FsResult<T> = std::result::Result<T, FsError>;

/// Backend failure, as classified right after the remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The addressed object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend is unreachable, rate-limited, or momentarily unavailable.
    #[error("backend unavailable: {0}")]
    Transient(String),

    /// Any other backend-reported failure (conflict, validation, stale hash).
    #[error("backend error: {0}")]
    Permanent(String),
}

impl Error {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a Transient error.
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Create a Permanent error.
    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::Permanent(msg.into())
    }

    /// Check if this is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this failure may succeed when retried later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }

    /// Translate at the adapter boundary, naming `path` if it was not found.
    pub(crate) fn at(self, path: &str) -> FsError {
        match self {
            Error::NotFound(_) => FsError::Permanent(catalog::no_such_file(path)),
            other => other.into(),
        }
    }

    /// Classify a non-success HTTP status.
    ///
    /// `rate_limited` is true when the backend reported an exhausted quota
    /// (GitHub signals this with a 403 and `x-ratelimit-remaining: 0`).
    pub fn from_status(status: u16, rate_limited: bool, detail: &str) -> Self {
        let msg = if detail.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, detail)
        };
        match status {
            404 => Error::NotFound(msg),
            403 if rate_limited => Error::Transient(msg),
            408 | 429 | 500 | 502 | 503 | 504 => Error::Transient(msg),
            _ => Error::Permanent(msg),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Permanent(format!("malformed response: {}", e))
    }
}

/// Failure returned to the protocol front end.
///
/// Every adapter operation resolves backend failures into exactly one of
/// these two kinds. The front end alone decides the wire-level reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// Retrying the same command will not help.
    #[error("{0}")]
    Permanent(String),

    /// The backend was momentarily unavailable; the command may be retried
    /// after re-checking state.
    #[error("{0}")]
    Transient(String),
}

impl FsError {
    /// Create a Permanent error.
    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::Permanent(msg.into())
    }

    /// Create a Transient error.
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Check if this is a transient failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, FsError::Transient(_))
    }

    /// Check if this is a permanent failure.
    pub fn is_permanent(&self) -> bool {
        matches!(self, FsError::Permanent(_))
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        match self {
            FsError::Permanent(msg) | FsError::Transient(msg) => msg,
        }
    }
}

/// Error translation at the adapter boundary.
///
/// A not-found reaching this point means the caller expected the object to
/// exist, so it becomes a permanent failure. The payload is backend detail,
/// not a path; use [`Error::at`] where the requested path is known.
impl From<Error> for FsError {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound(_) => FsError::Permanent(catalog::NO_SUCH_FILE.to_string()),
            Error::Transient(msg) => FsError::Transient(msg),
            Error::Permanent(msg) => FsError::Permanent(msg),
        }
    }
}

/// Resolve not-found locally instead of propagating it.
pub(crate) trait NotFoundExt<T> {
    /// `Ok(None)` on not-found, everything else unchanged.
    fn found(self) -> Result<Option<T>>;
}

impl<T> NotFoundExt<T> for Result<T> {
    fn found(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Fixed messages for failures the adapter raises itself.
pub mod catalog {
    /// Object absent where the caller expected one.
    pub const NO_SUCH_FILE: &str = "No such file or directory";
    /// File-only operation applied to a directory.
    pub const IS_A_DIRECTORY: &str = "Is a directory";
    /// Directory-only operation applied to a file.
    pub const NOT_A_DIRECTORY: &str = "Not a directory";
    /// rmdir on a directory that still has sub-directories.
    pub const DIRECTORY_NOT_EMPTY: &str = "Directory not empty";
    /// Target of a create already present.
    pub const ALREADY_EXISTS: &str = "File exists";
    /// Operation refused on the virtual root.
    pub const PERMISSION_DENIED: &str = "Permission denied";
    /// Capability missing from the backend.
    pub const UNSUPPORTED: &str = "Operation not supported by this backend";
    /// Upload stream could not be drained.
    pub const UPLOAD_READ_FAILED: &str = "Failed to read upload data";

    /// `No such file or directory: <path>`
    pub fn no_such_file(path: &str) -> String {
        format!("{}: {}", NO_SUCH_FILE, display(path))
    }

    /// `Is a directory: <path>`
    pub fn is_a_directory(path: &str) -> String {
        format!("{}: {}", IS_A_DIRECTORY, display(path))
    }

    /// `Not a directory: <path>`
    pub fn not_a_directory(path: &str) -> String {
        format!("{}: {}", NOT_A_DIRECTORY, display(path))
    }

    /// `Directory not empty: <path>`
    pub fn directory_not_empty(path: &str) -> String {
        format!("{}: {}", DIRECTORY_NOT_EMPTY, display(path))
    }

    /// `File exists: <path>`
    pub fn already_exists(path: &str) -> String {
        format!("{}: {}", ALREADY_EXISTS, display(path))
    }

    /// `Permission denied: <path>`
    pub fn permission_denied(path: &str) -> String {
        format!("{}: {}", PERMISSION_DENIED, display(path))
    }

    /// `Operation not supported by this backend: <op>`
    pub fn unsupported(op: &str) -> String {
        format!("{}: {}", UNSUPPORTED, op)
    }

    /// Rename wrote the destination but could not remove the source.
    pub fn rename_incomplete(from: &str, to: &str, cause: &str) -> String {
        format!(
            "Rename incomplete: {} was copied to {} but could not be removed ({})",
            display(from),
            display(to),
            cause
        )
    }

    fn display(path: &str) -> String {
        format!("/{}", path.trim_start_matches('/'))
    }
}
