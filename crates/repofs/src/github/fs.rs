//! Hierarchical adapter over the contents API.
//!
//! # Directory model
//!
//! The repository stores files only. A path is a directory exactly when a
//! lookup answers with the collection shape, which happens while at least
//! one file lives under it. `mkdir` therefore writes a placeholder file
//! (`.gitkeep` by default) and `rmdir` deletes the files that remain.
//!
//! # Mutations
//!
//! Every mutation is a commit addressed by the file's current blob hash.
//! The hash is resolved by a lookup immediately before the mutation; a
//! concurrent change in between is rejected by the backend and surfaces as
//! a permanent failure. Nothing is retried.

use async_trait::async_trait;
use std::time::SystemTime;
use tokio::io::AsyncRead;

use super::api::{Contents, ContentsApi};
use super::client::GitHubClient;
use super::config::{DEFAULT_MESSAGE_PREFIX, DEFAULT_PLACEHOLDER, GitHubConfig};
use crate::error::{FsError, FsResult, NotFoundExt, Result, catalog};
use crate::fs::{
    Content, Deleter, DirectoryOps, FileInfo, FileSystem, Lister, Prober, Reader, Renamer, Writer,
    drain, rename_via_copy,
};
use crate::path::{self, GlobPattern};

/// File system backed by a contents API.
///
/// # Example
///
/// ```rust
/// use repofs::{GitHubFs, InMemoryRepo, Prober, Reader};
///
/// # tokio_test::block_on(async {
/// let fs = GitHubFs::new(InMemoryRepo::new().with_file("docs/readme.md", "hi"));
///
/// assert!(fs.is_directory("/docs").await?);
/// assert_eq!(fs.read("/docs/readme.md").await?.as_bytes(), b"hi");
/// # Ok::<(), repofs::FsError>(())
/// # }).unwrap();
/// ```
pub struct GitHubFs<C: ContentsApi = GitHubClient> {
    api: C,
    placeholder: String,
    message_prefix: String,
}

impl GitHubFs<GitHubClient> {
    /// Bind to the repository described by `config`.
    ///
    /// # Errors
    /// - `Permanent` if the HTTP client cannot be built
    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        Ok(Self::new(GitHubClient::new(config)?)
            .with_placeholder(config.placeholder.clone())
            .with_message_prefix(config.message_prefix.clone()))
    }
}

impl<C: ContentsApi> GitHubFs<C> {
    /// Wrap an API handle with default placeholder and message prefix.
    pub fn new(api: C) -> Self {
        Self {
            api,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_string(),
        }
    }

    /// Set the placeholder file name used by `mkdir`.
    pub fn with_placeholder(mut self, name: impl Into<String>) -> Self {
        self.placeholder = name.into();
        self
    }

    /// Set the prefix of generated commit messages.
    pub fn with_message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = prefix.into();
        self
    }

    /// The underlying API handle.
    pub fn api(&self) -> &C {
        &self.api
    }

    /// Placeholder file name.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    fn message(&self, verb: &str, key: &str) -> String {
        format!("{}: {} {}", self.message_prefix, verb, path::qualify(key))
    }

    /// Lookup with not-found resolved to `None`.
    async fn lookup(&self, key: &str) -> FsResult<Option<Contents>> {
        self.api.get(key).await.found().map_err(FsError::from)
    }

    /// Lookup of an object the caller expects to exist.
    async fn require(&self, key: &str) -> FsResult<Contents> {
        self.api.get(key).await.map_err(|e| e.at(key))
    }
}

#[async_trait]
impl<C: ContentsApi> Prober for GitHubFs<C> {
    async fn exists(&self, path: &str) -> FsResult<bool> {
        Ok(self.lookup(&path::object_key(path)).await?.is_some())
    }

    async fn is_directory(&self, path: &str) -> FsResult<bool> {
        let found = self.lookup(&path::object_key(path)).await?;
        Ok(found.is_some_and(|c| c.is_dir()))
    }

    async fn file_info(&self, path: &str) -> FsResult<FileInfo> {
        let key = path::object_key(path);
        match self.require(&key).await? {
            Contents::Dir(_) => Ok(FileInfo::directory(key)),
            // The contents API carries no timestamps.
            Contents::File(file) => Ok(FileInfo::file(key, file.size, SystemTime::now())),
        }
    }
}

#[async_trait]
impl<C: ContentsApi> Reader for GitHubFs<C> {
    async fn read(&self, path: &str) -> FsResult<Content> {
        let key = path::object_key(path);
        match self.require(&key).await? {
            Contents::File(file) => Ok(Content::new(file.content)),
            Contents::Dir(_) => Err(FsError::permanent(catalog::is_a_directory(&key))),
        }
    }
}

#[async_trait]
impl<C: ContentsApi> Writer for GitHubFs<C> {
    async fn write(&self, path: &str, data: &mut (dyn AsyncRead + Unpin + Send)) -> FsResult<()> {
        let bytes = drain(data).await?;
        let key = path::object_key(path);

        match self.lookup(&key).await? {
            Some(Contents::File(current)) => {
                log_trace!(
                    path = %crate::logging_impl::sanitize_for_log(&key),
                    sha = %current.sha,
                    "updating existing file"
                );
                self.api
                    .update(&key, &bytes, &current.sha, &self.message("update", &key))
                    .await
                    .map_err(|e| e.at(&key))
            }
            Some(Contents::Dir(_)) => Err(FsError::permanent(catalog::is_a_directory(&key))),
            None => {
                log_trace!(path = %crate::logging_impl::sanitize_for_log(&key), "creating new file");
                self.api
                    .create(&key, &bytes, &self.message("create", &key))
                    .await
                    .map_err(|e| e.at(&key))
            }
        }
    }
}

#[async_trait]
impl<C: ContentsApi> Lister for GitHubFs<C> {
    async fn dir(&self, path: &str) -> FsResult<Vec<String>> {
        let pattern = GlobPattern::parse(path);

        if !pattern.is_wildcard() {
            let key = path::object_key(path);
            return Ok(match self.lookup(&key).await? {
                Some(_) => vec![path::qualify(&key)],
                None => Vec::new(),
            });
        }

        let entries = match self.lookup(pattern.directory()).await? {
            Some(Contents::Dir(entries)) => entries,
            // A file cannot have children; a missing directory has none.
            Some(Contents::File(_)) | None => return Ok(Vec::new()),
        };

        let matched: Vec<String> = entries
            .iter()
            .filter(|e| pattern.matches(&e.path))
            .map(|e| path::qualify(&e.path))
            .collect();
        log_trace!(
            pattern = %crate::logging_impl::sanitize_for_log(path),
            count = matched.len(),
            "expanded glob"
        );
        Ok(matched)
    }
}

#[async_trait]
impl<C: ContentsApi> Deleter for GitHubFs<C> {
    async fn delete(&self, path: &str) -> FsResult<()> {
        let key = path::object_key(path);
        match self.require(&key).await? {
            Contents::File(file) => self
                .api
                .delete(&key, &file.sha, &self.message("delete", &key))
                .await
                .map_err(|e| e.at(&key)),
            Contents::Dir(_) => Err(FsError::permanent(catalog::is_a_directory(&key))),
        }
    }
}

#[async_trait]
impl<C: ContentsApi> DirectoryOps for GitHubFs<C> {
    async fn mkdir(&self, path: &str) -> FsResult<()> {
        let key = path::object_key(path);
        if key.is_empty() {
            return Err(FsError::permanent(catalog::already_exists(&key)));
        }
        if let Some(Contents::File(_)) = self.lookup(&key).await? {
            return Err(FsError::permanent(catalog::already_exists(&key)));
        }

        let marker = path::join(&key, &self.placeholder);
        self.api
            .create(&marker, &[], &self.message("mkdir", &key))
            .await
            .map_err(|e| e.at(&marker))
    }

    async fn rmdir(&self, path: &str) -> FsResult<()> {
        let key = path::object_key(path);
        if key.is_empty() {
            return Err(FsError::permanent(catalog::permission_denied(&key)));
        }
        let entries = match self.require(&key).await? {
            Contents::Dir(entries) => entries,
            Contents::File(_) => return Err(FsError::permanent(catalog::not_a_directory(&key))),
        };
        if entries.iter().any(|e| e.is_dir()) {
            return Err(FsError::permanent(catalog::directory_not_empty(&key)));
        }

        let message = self.message("rmdir", &key);
        for entry in &entries {
            self.api
                .delete(&entry.path, &entry.sha, &message)
                .await
                .map_err(|e| e.at(&entry.path))?;
        }
        Ok(())
    }
}

#[async_trait]
impl<C: ContentsApi> Renamer for GitHubFs<C> {
    async fn rename(&self, from: &str, to: &str) -> FsResult<()> {
        rename_via_copy(self, from, to).await
    }
}

impl<C: ContentsApi> FileSystem for GitHubFs<C> {
    fn as_writer(&self) -> Option<&dyn Writer> {
        Some(self)
    }

    fn as_deleter(&self) -> Option<&dyn Deleter> {
        Some(self)
    }

    fn as_directories(&self) -> Option<&dyn DirectoryOps> {
        Some(self)
    }

    fn as_renamer(&self) -> Option<&dyn Renamer> {
        Some(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fs::Capabilities;
    use crate::github::InMemoryRepo;
    use pretty_assertions::assert_eq;

    fn fs_with(files: &[(&str, &str)]) -> GitHubFs<InMemoryRepo> {
        let repo = InMemoryRepo::new();
        for (path, content) in files {
            repo.insert(path, *content);
        }
        GitHubFs::new(repo)
    }

    async fn put<C: ContentsApi>(fs: &GitHubFs<C>, path: &str, content: &str) -> FsResult<()> {
        let mut data = content.as_bytes();
        fs.write(path, &mut data).await
    }

    #[tokio::test]
    async fn test_write_creates_then_updates() {
        let fs = fs_with(&[]);
        put(&fs, "/a.txt", "one").await.unwrap();
        put(&fs, "/a.txt", "two").await.unwrap();

        assert_eq!(fs.read("/a.txt").await.unwrap().as_bytes(), b"two");
        assert_eq!(
            fs.api().commit_messages(),
            vec!["repofs: create /a.txt", "repofs: update /a.txt"]
        );
    }

    #[tokio::test]
    async fn test_write_onto_directory_fails() {
        let fs = fs_with(&[("docs/a.txt", "A")]);
        let err = put(&fs, "/docs", "x").await.unwrap_err();
        assert_eq!(err, FsError::permanent("Is a directory: /docs"));
    }

    #[tokio::test]
    async fn test_read_directory_fails() {
        let fs = fs_with(&[("docs/a.txt", "A")]);
        let err = fs.read("/docs").await.unwrap_err();
        assert!(err.is_permanent());
        assert_eq!(err.message(), "Is a directory: /docs");
    }

    #[tokio::test]
    async fn test_read_missing_is_permanent_with_catalog_message() {
        let fs = fs_with(&[]);
        let err = fs.read("/nope.txt").await.unwrap_err();
        assert_eq!(err, FsError::permanent("No such file or directory: /nope.txt"));
    }

    #[tokio::test]
    async fn test_file_info() {
        let fs = fs_with(&[("docs/a.txt", "hello")]);

        let info = fs.file_info("/docs/a.txt").await.unwrap();
        assert!(!info.is_dir());
        assert_eq!(info.size, 5);
        assert_eq!(info.path, "docs/a.txt");

        let info = fs.file_info("/docs").await.unwrap();
        assert!(info.is_dir());
        assert_eq!(info.size, 0);
        assert_eq!(info.mtime, SystemTime::UNIX_EPOCH);

        assert!(fs.file_info("/missing").await.unwrap_err().is_permanent());
    }

    #[tokio::test]
    async fn test_root_is_a_directory() {
        let fs = fs_with(&[]);
        assert!(fs.exists("/").await.unwrap());
        assert!(fs.is_directory("/").await.unwrap());
    }

    #[tokio::test]
    async fn test_dir_plain_path() {
        let fs = fs_with(&[("docs/a.txt", "A")]);
        assert_eq!(fs.dir("/docs/a.txt").await.unwrap(), vec!["/docs/a.txt"]);
        assert_eq!(fs.dir("/docs").await.unwrap(), vec!["/docs"]);
        assert!(fs.dir("/nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dir_glob_expansion() {
        let fs = fs_with(&[
            ("a.txt", "A"),
            ("docs/readme.md", "R"),
            ("docs/license", "L"),
            ("docs/img/logo.png", "P"),
            ("docsite/index.html", "I"),
        ]);

        assert_eq!(
            fs.dir("/docs/*").await.unwrap(),
            vec!["/docs/img", "/docs/license", "/docs/readme.md"]
        );
        assert_eq!(fs.dir("/docs/re*").await.unwrap(), vec!["/docs/readme.md"]);
        assert_eq!(
            fs.dir("/*").await.unwrap(),
            vec!["/a.txt", "/docs", "/docsite"]
        );
        assert!(fs.dir("/missing/*").await.unwrap().is_empty());
        assert!(fs.dir("/a.txt/*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let fs = fs_with(&[("a.txt", "A"), ("docs/b.txt", "B")]);
        fs.delete("/a.txt").await.unwrap();
        assert!(!fs.exists("/a.txt").await.unwrap());

        assert_eq!(
            fs.delete("/a.txt").await.unwrap_err(),
            FsError::permanent("No such file or directory: /a.txt")
        );
        assert_eq!(
            fs.delete("/docs").await.unwrap_err(),
            FsError::permanent("Is a directory: /docs")
        );
    }

    #[tokio::test]
    async fn test_mkdir_writes_placeholder() {
        let fs = fs_with(&[]).with_placeholder(".keep");
        fs.mkdir("/new").await.unwrap();

        assert!(fs.is_directory("/new").await.unwrap());
        assert_eq!(fs.api().paths(), vec!["new/.keep"]);
        assert_eq!(fs.dir("/new/*").await.unwrap(), vec!["/new/.keep"]);
    }

    #[tokio::test]
    async fn test_mkdir_conflicts() {
        let fs = fs_with(&[("a.txt", "A"), ("d/.gitkeep", "")]);
        assert_eq!(
            fs.mkdir("/a.txt").await.unwrap_err(),
            FsError::permanent("File exists: /a.txt")
        );
        // The placeholder already exists: the create is rejected by the backend.
        assert!(fs.mkdir("/d").await.unwrap_err().is_permanent());
        assert!(fs.mkdir("/").await.unwrap_err().is_permanent());
    }

    #[tokio::test]
    async fn test_rmdir() {
        let fs = fs_with(&[("d/.gitkeep", ""), ("d/a.txt", "A"), ("other.txt", "O")]);
        fs.rmdir("/d").await.unwrap();

        assert!(!fs.is_directory("/d").await.unwrap());
        assert!(!fs.exists("/d").await.unwrap());
        assert_eq!(fs.api().paths(), vec!["other.txt"]);
    }

    #[tokio::test]
    async fn test_rmdir_refusals() {
        let fs = fs_with(&[("d/sub/a.txt", "A"), ("f.txt", "F")]);
        assert_eq!(
            fs.rmdir("/d").await.unwrap_err(),
            FsError::permanent("Directory not empty: /d")
        );
        assert_eq!(
            fs.rmdir("/f.txt").await.unwrap_err(),
            FsError::permanent("Not a directory: /f.txt")
        );
        assert!(fs.rmdir("/missing").await.unwrap_err().is_permanent());
        assert_eq!(fs.api().paths(), vec!["d/sub/a.txt", "f.txt"]);
    }

    #[tokio::test]
    async fn test_rmdir_root_is_refused() {
        let fs = fs_with(&[("a.txt", "A"), ("README.md", "R")]);
        assert_eq!(
            fs.rmdir("/").await.unwrap_err(),
            FsError::permanent("Permission denied: /")
        );
        assert_eq!(fs.api().paths(), vec!["README.md", "a.txt"]);
        assert_eq!(fs.api().call_count(), 0);
    }

    #[tokio::test]
    async fn test_rename_moves_content() {
        let fs = fs_with(&[("a.txt", "payload")]);
        fs.rename("/a.txt", "/moved/b.txt").await.unwrap();

        assert!(!fs.exists("/a.txt").await.unwrap());
        assert_eq!(fs.read("/moved/b.txt").await.unwrap().as_bytes(), b"payload");
    }

    #[tokio::test]
    async fn test_rename_onto_itself_is_a_noop() {
        let fs = fs_with(&[("a.txt", "payload")]);
        fs.rename("/a.txt", "a.txt").await.unwrap();
        assert_eq!(fs.api().call_count(), 0);
    }

    /// Repository that answers creates or deletes with a fixed error.
    struct Rejecting {
        repo: InMemoryRepo,
        create: Option<Error>,
        delete: Option<Error>,
    }

    #[async_trait]
    impl ContentsApi for Rejecting {
        async fn get(&self, path: &str) -> Result<Contents> {
            self.repo.get(path).await
        }
        async fn create(&self, path: &str, content: &[u8], message: &str) -> Result<()> {
            match &self.create {
                Some(e) => Err(e.clone()),
                None => self.repo.create(path, content, message).await,
            }
        }
        async fn update(&self, path: &str, content: &[u8], sha: &str, message: &str) -> Result<()> {
            self.repo.update(path, content, sha, message).await
        }
        async fn delete(&self, path: &str, sha: &str, message: &str) -> Result<()> {
            match &self.delete {
                Some(e) => Err(e.clone()),
                None => self.repo.delete(path, sha, message).await,
            }
        }
    }

    #[tokio::test]
    async fn test_rename_partial_failure_leaves_both_copies() {
        let fs = GitHubFs::new(Rejecting {
            repo: InMemoryRepo::new().with_file("a.txt", "payload"),
            create: None,
            delete: Some(Error::from_status(409, false, "sha mismatch")),
        });

        let err = fs.rename("/a.txt", "/b.txt").await.unwrap_err();
        assert!(err.is_permanent());
        assert!(err.message().starts_with("Rename incomplete: /a.txt was copied to /b.txt"));
        assert_eq!(fs.api().repo.paths(), vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_create_not_found_names_the_path() {
        let fs = GitHubFs::new(Rejecting {
            repo: InMemoryRepo::new(),
            create: Some(Error::from_status(404, false, "Not Found")),
            delete: None,
        });

        assert_eq!(
            put(&fs, "/docs/a.txt", "x").await.unwrap_err(),
            FsError::permanent("No such file or directory: /docs/a.txt")
        );
        assert_eq!(
            fs.mkdir("/docs").await.unwrap_err(),
            FsError::permanent("No such file or directory: /docs/.gitkeep")
        );
    }

    #[tokio::test]
    async fn test_rename_missing_source_has_no_side_effects() {
        let fs = fs_with(&[]);
        let err = fs.rename("/a.txt", "/b.txt").await.unwrap_err();
        assert_eq!(err, FsError::permanent("No such file or directory: /a.txt"));
        assert!(fs.api().paths().is_empty());
    }

    #[tokio::test]
    async fn test_capabilities() {
        let fs = fs_with(&[]);
        assert_eq!(fs.capabilities(), Capabilities::all());
    }
}
