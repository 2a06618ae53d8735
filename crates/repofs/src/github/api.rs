//! Contents API contract and wire format.
//!
//! The contents endpoint answers a path lookup with one of two shapes: a
//! JSON object for a file, a JSON array for a directory. That shape is the
//! only directory signal the backend gives.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Entry type as reported by the contents API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// One element of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    /// Last path component
    pub name: String,
    /// Full path from the repository root
    pub path: String,
    /// Blob (or tree) hash
    pub sha: String,
    /// Size in bytes, 0 for directories
    #[serde(default)]
    pub size: u64,
    /// Entry type
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl ContentEntry {
    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// A single file, content decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    /// Full path from the repository root
    pub path: String,
    /// Current blob hash; required to update or delete this version
    pub sha: String,
    /// Size in bytes
    pub size: u64,
    /// Decoded content
    pub content: Vec<u8>,
}

/// Result of a path lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    /// Single-object shape
    File(ContentFile),
    /// Collection shape
    Dir(Vec<ContentEntry>),
}

impl Contents {
    /// Check if the lookup returned the collection shape.
    pub fn is_dir(&self) -> bool {
        matches!(self, Contents::Dir(_))
    }
}

/// Operations the hierarchical backend needs from the remote store.
///
/// Paths are backend keys (no leading separator, `""` for the root).
/// Mutations take a commit message because every change is a commit.
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// Look up a path.
    ///
    /// # Errors
    /// - `NotFound` if nothing exists at or under the path
    async fn get(&self, path: &str) -> Result<Contents>;

    /// Create a new file. Fails if a file already exists at `path`.
    async fn create(&self, path: &str, content: &[u8], message: &str) -> Result<()>;

    /// Replace the file whose current hash is `sha`.
    ///
    /// # Errors
    /// - `Permanent` if `sha` is stale
    async fn update(&self, path: &str, content: &[u8], sha: &str, message: &str) -> Result<()>;

    /// Delete the file whose current hash is `sha`.
    ///
    /// # Errors
    /// - `Permanent` if `sha` is stale
    async fn delete(&self, path: &str, sha: &str, message: &str) -> Result<()>;
}

/// Committer identity attached to mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Committer {
    pub name: String,
    pub email: String,
}

/// Body of a create or update request.
#[derive(Debug, Serialize)]
pub(crate) struct PutBody<'a> {
    pub message: &'a str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer: Option<&'a Committer>,
}

/// Body of a delete request.
#[derive(Debug, Serialize)]
pub(crate) struct DeleteBody<'a> {
    pub message: &'a str,
    pub sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer: Option<&'a Committer>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    path: String,
    sha: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContents {
    Dir(Vec<ContentEntry>),
    File(RawFile),
}

/// A parsed lookup response.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Parsed {
    /// Fully usable as returned
    Ready(Contents),
    /// A file whose content was omitted (over 1 MB, or not base64); it must
    /// be fetched again with the raw media type.
    NeedsRaw { path: String, sha: String, size: u64 },
}

/// Parse a contents lookup body.
pub(crate) fn parse_contents(body: &[u8]) -> Result<Parsed> {
    match serde_json::from_slice::<RawContents>(body)? {
        RawContents::Dir(entries) => Ok(Parsed::Ready(Contents::Dir(entries))),
        RawContents::File(raw) => match (raw.encoding.as_deref(), raw.content) {
            (Some("base64"), Some(content)) => Ok(Parsed::Ready(Contents::File(ContentFile {
                path: raw.path,
                sha: raw.sha,
                size: raw.size,
                content: decode_base64(&content)?,
            }))),
            _ => Ok(Parsed::NeedsRaw {
                path: raw.path,
                sha: raw.sha,
                size: raw.size,
            }),
        },
    }
}

/// Decode the transport encoding. The API wraps base64 at 60 columns.
pub(crate) fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::permanent(format!("malformed content encoding: {}", e)))
}

/// Reject keys with `.` or `..` segments.
///
/// URL normalization would collapse them into a different object, so they
/// never reach the backend.
pub(crate) fn check_segments(path: &str) -> Result<()> {
    if path.split('/').any(|s| s == "." || s == "..") {
        return Err(Error::permanent(format!(
            "invalid path segment in {}",
            crate::path::qualify(path)
        )));
    }
    Ok(())
}

/// Encode bytes for a create or update request.
pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dot_segments_are_rejected() {
        assert!(check_segments("docs/a.txt").is_ok());
        assert!(check_segments("docs/.gitkeep").is_ok());
        assert!(check_segments("").is_ok());
        assert_eq!(
            check_segments("docs/../secret"),
            Err(Error::permanent("invalid path segment in /docs/../secret"))
        );
        assert!(check_segments("./a").is_err());
    }

    #[test]
    fn test_parse_file_shape() {
        let body = br#"{
            "type": "file",
            "encoding": "base64",
            "size": 11,
            "name": "a.txt",
            "path": "docs/a.txt",
            "sha": "3b18e512dba79e4c8300dd08aeb37f8e728b8dad",
            "content": "aGVsbG8g\nd29ybGQ=\n"
        }"#;
        let parsed = parse_contents(body).unwrap();
        assert_eq!(
            parsed,
            Parsed::Ready(Contents::File(ContentFile {
                path: "docs/a.txt".to_string(),
                sha: "3b18e512dba79e4c8300dd08aeb37f8e728b8dad".to_string(),
                size: 11,
                content: b"hello world".to_vec(),
            }))
        );
    }

    #[test]
    fn test_parse_dir_shape() {
        let body = br#"[
            {"type": "file", "size": 5, "name": "a.txt", "path": "docs/a.txt", "sha": "aaa"},
            {"type": "dir", "size": 0, "name": "img", "path": "docs/img", "sha": "bbb"}
        ]"#;
        let Parsed::Ready(Contents::Dir(entries)) = parse_contents(body).unwrap() else {
            panic!("expected directory shape");
        };
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_dir());
        assert!(entries[1].is_dir());
        assert_eq!(entries[1].path, "docs/img");
    }

    #[test]
    fn test_parse_empty_dir() {
        assert_eq!(
            parse_contents(b"[]").unwrap(),
            Parsed::Ready(Contents::Dir(vec![]))
        );
    }

    #[test]
    fn test_large_file_needs_raw_fetch() {
        let body = br#"{"type":"file","encoding":"none","size":2000000,"name":"big.bin",
                        "path":"big.bin","sha":"ccc","content":""}"#;
        assert_eq!(
            parse_contents(body).unwrap(),
            Parsed::NeedsRaw {
                path: "big.bin".to_string(),
                sha: "ccc".to_string(),
                size: 2_000_000,
            }
        );
    }

    #[test]
    fn test_malformed_body_is_permanent() {
        let err = parse_contents(b"<html>").unwrap_err();
        assert!(matches!(err, Error::Permanent(_)));
    }

    #[test]
    fn test_put_body_omits_absent_fields() {
        let body = PutBody {
            message: "repofs: create /a.txt",
            content: encode_base64(b"hi"),
            sha: None,
            branch: None,
            committer: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"message":"repofs: create /a.txt","content":"aGk="}"#);
    }

    #[test]
    fn test_delete_body_with_branch() {
        let committer = Committer {
            name: "Bot".to_string(),
            email: "bot@example.com".to_string(),
        };
        let body = DeleteBody {
            message: "m",
            sha: "abc",
            branch: Some("main"),
            committer: Some(&committer),
        };
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sha"], "abc");
        assert_eq!(json["branch"], "main");
        assert_eq!(json["committer"]["email"], "bot@example.com");
    }
}
