//! In-memory contents store.
//!
//! Behaves like the remote contents API for everything the adapter relies
//! on: blob hashes change with content, updates and deletes require the
//! current hash, directories exist only while something lives under them.
//! Failures are reported with the same status classification as the REST
//! binding.

use async_trait::async_trait;
use sha1::{Digest, Sha1};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use super::api::{
    ContentEntry, ContentFile, Contents, ContentsApi, EntryKind, check_segments,
};
use crate::error::{Error, Result};

/// In-memory repository.
#[derive(Default)]
pub struct InMemoryRepo {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    faults: Mutex<VecDeque<Error>>,
    calls: AtomicUsize,
    messages: Mutex<Vec<String>>,
}

impl InMemoryRepo {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file (builder form).
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Seed a file, bypassing hash checks.
    pub fn insert(&self, path: &str, content: impl Into<Vec<u8>>) {
        let mut files = self.files.write().unwrap();
        files.insert(key(path), content.into());
    }

    /// Make the next call fail with `error`. Queued faults fire in order.
    pub fn fail_next(&self, error: Error) {
        self.faults.lock().unwrap().push_back(error);
    }

    /// Number of API calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Commit messages of successful mutations, oldest first.
    pub fn commit_messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Stored content of a file.
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(&key(path)).cloned()
    }

    /// Current blob hash of a file.
    pub fn sha_of(&self, path: &str) -> Option<String> {
        self.file(path).map(|c| blob_sha(&c))
    }

    /// All file paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.files.read().unwrap().keys().cloned().collect()
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.faults.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Git blob hash: SHA-1 over `blob <len>\0<content>`.
pub fn blob_sha(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn key(path: &str) -> String {
    path.trim_matches('/').to_string()
}

fn conflict(status: u16, detail: String) -> Error {
    Error::from_status(status, false, &detail)
}

fn has_children(files: &BTreeMap<String, Vec<u8>>, dir: &str) -> bool {
    let prefix = format!("{}/", dir);
    files
        .range(prefix.clone()..)
        .next()
        .is_some_and(|(k, _)| k.starts_with(&prefix))
}

fn ancestor_file<'a>(files: &BTreeMap<String, Vec<u8>>, path: &'a str) -> Option<&'a str> {
    path.match_indices('/')
        .map(|(i, _)| &path[..i])
        .find(|ancestor| files.contains_key(*ancestor))
}

#[async_trait]
impl ContentsApi for InMemoryRepo {
    async fn get(&self, path: &str) -> Result<Contents> {
        self.begin_call()?;
        let path = key(path);
        check_segments(&path)?;
        let files = self.files.read().unwrap();

        if let Some(content) = files.get(&path) {
            return Ok(Contents::File(ContentFile {
                path: path.clone(),
                sha: blob_sha(content),
                size: content.len() as u64,
                content: content.clone(),
            }));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };
        let mut entries = Vec::new();
        let mut seen_dirs = HashSet::new();
        for (file_path, content) in files.range(prefix.clone()..) {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    if seen_dirs.insert(dir.to_string()) {
                        let dir_path = format!("{}{}", prefix, dir);
                        entries.push(ContentEntry {
                            name: dir.to_string(),
                            sha: blob_sha(dir_path.as_bytes()),
                            path: dir_path,
                            size: 0,
                            kind: EntryKind::Dir,
                        });
                    }
                }
                None => entries.push(ContentEntry {
                    name: rest.to_string(),
                    path: file_path.clone(),
                    sha: blob_sha(content),
                    size: content.len() as u64,
                    kind: EntryKind::File,
                }),
            }
        }

        if entries.is_empty() && !path.is_empty() {
            return Err(Error::not_found(path));
        }
        Ok(Contents::Dir(entries))
    }

    async fn create(&self, path: &str, content: &[u8], message: &str) -> Result<()> {
        self.begin_call()?;
        let path = key(path);
        check_segments(&path)?;
        let mut files = self.files.write().unwrap();

        if path.is_empty() {
            return Err(conflict(422, "path cannot be empty".to_string()));
        }
        if files.contains_key(&path) {
            return Err(conflict(
                422,
                format!("Invalid request. \"sha\" wasn't supplied for {}", path),
            ));
        }
        if has_children(&files, &path) {
            return Err(conflict(422, format!("{} is a directory", path)));
        }
        if let Some(file) = ancestor_file(&files, &path) {
            return Err(conflict(422, format!("{} is a file", file)));
        }

        files.insert(path, content.to_vec());
        self.record(message);
        Ok(())
    }

    async fn update(&self, path: &str, content: &[u8], sha: &str, message: &str) -> Result<()> {
        self.begin_call()?;
        let path = key(path);
        check_segments(&path)?;
        let mut files = self.files.write().unwrap();

        let Some(current) = files.get(&path) else {
            return Err(Error::not_found(path));
        };
        if blob_sha(current) != sha {
            return Err(conflict(409, format!("{} does not match {}", path, sha)));
        }

        files.insert(path, content.to_vec());
        self.record(message);
        Ok(())
    }

    async fn delete(&self, path: &str, sha: &str, message: &str) -> Result<()> {
        self.begin_call()?;
        let path = key(path);
        check_segments(&path)?;
        let mut files = self.files.write().unwrap();

        let Some(current) = files.get(&path) else {
            return Err(Error::not_found(path));
        };
        if blob_sha(current) != sha {
            return Err(conflict(409, format!("{} does not match {}", path, sha)));
        }

        files.remove(&path);
        self.record(message);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blob_sha_matches_git() {
        // `printf 'hello world' | git hash-object --stdin`
        assert_eq!(blob_sha(b"hello world"), "95d09f2b10159347eece71399a7e2e907ea3df4f");
        // `git hash-object /dev/null`
        assert_eq!(blob_sha(b""), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[tokio::test]
    async fn test_get_file_and_listing() {
        let repo = InMemoryRepo::new()
            .with_file("a.txt", "A")
            .with_file("docs/b.txt", "B")
            .with_file("docs/img/c.png", "C")
            .with_file("docs/img/d.png", "D");

        let Contents::File(file) = repo.get("a.txt").await.unwrap() else {
            panic!("expected file");
        };
        assert_eq!(file.content, b"A");
        assert_eq!(file.sha, blob_sha(b"A"));

        let Contents::Dir(entries) = repo.get("docs").await.unwrap() else {
            panic!("expected dir");
        };
        let paths: Vec<_> = entries.iter().map(|e| (e.path.as_str(), e.kind)).collect();
        assert_eq!(
            paths,
            vec![("docs/b.txt", EntryKind::File), ("docs/img", EntryKind::Dir)]
        );

        let Contents::Dir(root) = repo.get("").await.unwrap() else {
            panic!("expected root dir");
        };
        assert_eq!(root.len(), 2);
    }

    #[tokio::test]
    async fn test_dot_segments_are_rejected() {
        let repo = InMemoryRepo::new().with_file("secret", "S");
        let err = repo.get("docs/../secret").await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(!err.is_transient());
        assert!(repo.create("../a.txt", b"x", "m").await.is_err());
        assert_eq!(repo.paths(), vec!["secret"]);
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let repo = InMemoryRepo::new().with_file("docs/b.txt", "B");
        assert!(repo.get("nope").await.unwrap_err().is_not_found());
        // A name that only shares a prefix with a directory is not inside it.
        assert!(repo.get("doc").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_empty_root_is_an_empty_listing() {
        let repo = InMemoryRepo::new();
        assert_eq!(repo.get("").await.unwrap(), Contents::Dir(vec![]));
    }

    #[tokio::test]
    async fn test_create_conflicts() {
        let repo = InMemoryRepo::new().with_file("a.txt", "A").with_file("d/x", "X");
        assert!(matches!(
            repo.create("a.txt", b"again", "m").await,
            Err(Error::Permanent(_))
        ));
        assert!(matches!(
            repo.create("d", b"", "m").await,
            Err(Error::Permanent(_))
        ));
        assert!(matches!(
            repo.create("a.txt/child", b"", "m").await,
            Err(Error::Permanent(_))
        ));
        assert_eq!(repo.paths(), vec!["a.txt", "d/x"]);
    }

    #[tokio::test]
    async fn test_stale_sha_is_rejected() {
        let repo = InMemoryRepo::new().with_file("a.txt", "v1");
        let stale = repo.sha_of("a.txt").unwrap();
        repo.update("a.txt", b"v2", &stale, "m").await.unwrap();

        let err = repo.update("a.txt", b"v3", &stale, "m").await.unwrap_err();
        assert!(matches!(err, Error::Permanent(ref m) if m.starts_with("HTTP 409")));
        let err = repo.delete("a.txt", &stale, "m").await.unwrap_err();
        assert!(matches!(err, Error::Permanent(_)));
        assert_eq!(repo.file("a.txt").unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_injected_faults_fire_in_order() {
        let repo = InMemoryRepo::new().with_file("a.txt", "A");
        repo.fail_next(Error::transient("HTTP 503"));
        assert_eq!(
            repo.get("a.txt").await.unwrap_err(),
            Error::transient("HTTP 503")
        );
        assert!(repo.get("a.txt").await.is_ok());
        assert_eq!(repo.call_count(), 2);
    }

    #[tokio::test]
    async fn test_commit_messages_recorded() {
        let repo = InMemoryRepo::new();
        repo.create("a.txt", b"A", "create a").await.unwrap();
        let sha = repo.sha_of("a.txt").unwrap();
        repo.delete("a.txt", &sha, "delete a").await.unwrap();
        assert_eq!(repo.commit_messages(), vec!["create a", "delete a"]);
    }
}
