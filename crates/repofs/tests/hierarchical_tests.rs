//! Hierarchical backend behavior, driven through the in-memory repository.
//!
//! Covers the round-trip properties of the adapter contract and the failure
//! classification of concurrent edits and backend outages.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use repofs::{
    Contents, ContentsApi, Deleter, DirectoryOps, Error, FileSystem, FsError, GitHubFs,
    InMemoryRepo, Lister, Prober, Reader, Renamer, Result, Writer,
};

async fn write(fs: &impl Writer, path: &str, content: &str) -> repofs::FsResult<()> {
    let mut data = content.as_bytes();
    fs.write(path, &mut data).await
}

// =============================================================================
// Round trips
// =============================================================================

#[tokio::test]
async fn write_then_read_returns_content() {
    let fs = GitHubFs::new(InMemoryRepo::new());
    write(&fs, "/notes/today.md", "# Today\n").await.unwrap();

    assert!(fs.exists("/notes/today.md").await.unwrap());
    assert_eq!(
        fs.read("/notes/today.md").await.unwrap().into_bytes(),
        b"# Today\n"
    );
}

#[tokio::test]
async fn write_then_delete_removes_file() {
    let fs = GitHubFs::new(InMemoryRepo::new());
    write(&fs, "/tmp.bin", "x").await.unwrap();
    fs.delete("/tmp.bin").await.unwrap();
    assert!(!fs.exists("/tmp.bin").await.unwrap());
}

#[tokio::test]
async fn rename_moves_content() {
    let fs = GitHubFs::new(InMemoryRepo::new().with_file("a.txt", "alpha"));
    fs.rename("/a.txt", "/archive/a.txt").await.unwrap();

    assert!(!fs.exists("/a.txt").await.unwrap());
    assert!(fs.exists("/archive/a.txt").await.unwrap());
    assert_eq!(
        fs.read("/archive/a.txt").await.unwrap().as_bytes(),
        b"alpha"
    );
}

#[tokio::test]
async fn rename_over_existing_destination_updates_it() {
    let fs = GitHubFs::new(
        InMemoryRepo::new()
            .with_file("new.txt", "fresh")
            .with_file("old.txt", "stale"),
    );
    fs.rename("/new.txt", "/old.txt").await.unwrap();

    assert_eq!(fs.api().paths(), vec!["old.txt"]);
    assert_eq!(fs.api().file("old.txt").unwrap(), b"fresh");
}

#[tokio::test]
async fn glob_lists_immediate_entries_only() {
    let fs = GitHubFs::new(
        InMemoryRepo::new()
            .with_file("sub/a.txt", "A")
            .with_file("sub/deep/b.txt", "B")
            .with_file("subway.txt", "S")
            .with_file("other/c.txt", "C"),
    );

    assert_eq!(
        fs.dir("/sub/*").await.unwrap(),
        vec!["/sub/a.txt", "/sub/deep"]
    );
}

#[tokio::test]
async fn mkdir_then_rmdir() {
    let fs = GitHubFs::new(InMemoryRepo::new());
    fs.mkdir("/photos").await.unwrap();
    assert!(fs.is_directory("/photos").await.unwrap());

    write(&fs, "/photos/cat.jpg", "meow").await.unwrap();
    fs.rmdir("/photos").await.unwrap();

    assert!(!fs.is_directory("/photos").await.unwrap());
    assert!(fs.api().paths().is_empty());
}

#[tokio::test]
async fn directory_disappears_with_its_last_file() {
    let fs = GitHubFs::new(InMemoryRepo::new().with_file("d/only.txt", "1"));
    fs.delete("/d/only.txt").await.unwrap();
    assert!(!fs.is_directory("/d").await.unwrap());
    assert!(!fs.exists("/d").await.unwrap());
}

#[tokio::test]
async fn not_found_resolves_to_false() {
    let fs = GitHubFs::new(InMemoryRepo::new());
    assert!(!fs.exists("/missing.txt").await.unwrap());
    assert!(!fs.is_directory("/missing").await.unwrap());
    assert!(fs.dir("/missing").await.unwrap().is_empty());
}

// =============================================================================
// Concurrent edits
// =============================================================================

/// Repository where another client commits between our lookup and our
/// mutation.
struct ConcurrentEditor(InMemoryRepo);

#[async_trait]
impl ContentsApi for ConcurrentEditor {
    async fn get(&self, path: &str) -> Result<Contents> {
        self.0.get(path).await
    }

    async fn create(&self, path: &str, content: &[u8], message: &str) -> Result<()> {
        self.0.insert(path, "created elsewhere");
        self.0.create(path, content, message).await
    }

    async fn update(&self, path: &str, content: &[u8], sha: &str, message: &str) -> Result<()> {
        self.0.insert(path, "edited elsewhere");
        self.0.update(path, content, sha, message).await
    }

    async fn delete(&self, path: &str, sha: &str, message: &str) -> Result<()> {
        self.0.insert(path, "edited elsewhere");
        self.0.delete(path, sha, message).await
    }
}

#[tokio::test]
async fn stale_hash_update_is_permanent_and_not_retried() {
    let fs = GitHubFs::new(ConcurrentEditor(
        InMemoryRepo::new().with_file("shared.txt", "v1"),
    ));

    let err = write(&fs, "/shared.txt", "mine").await.unwrap_err();
    assert!(err.is_permanent());
    assert!(err.message().starts_with("HTTP 409"));

    // One lookup, one update attempt.
    assert_eq!(fs.api().0.call_count(), 2);
    assert_eq!(fs.api().0.file("shared.txt").unwrap(), b"edited elsewhere");
}

#[tokio::test]
async fn create_race_is_permanent() {
    let fs = GitHubFs::new(ConcurrentEditor(InMemoryRepo::new()));

    let err = write(&fs, "/new.txt", "mine").await.unwrap_err();
    assert!(err.is_permanent());
    assert_eq!(fs.api().0.call_count(), 2);
    assert_eq!(fs.api().0.file("new.txt").unwrap(), b"created elsewhere");
}

#[tokio::test]
async fn stale_hash_delete_is_permanent() {
    let fs = GitHubFs::new(ConcurrentEditor(
        InMemoryRepo::new().with_file("shared.txt", "v1"),
    ));
    assert!(fs.delete("/shared.txt").await.unwrap_err().is_permanent());
    assert!(fs.exists("/shared.txt").await.unwrap());
}

// =============================================================================
// Backend outages
// =============================================================================

#[tokio::test]
async fn transient_lookup_failure_propagates_from_probes() {
    let repo = InMemoryRepo::new().with_file("a.txt", "A");
    repo.fail_next(Error::from_status(503, false, "Service Unavailable"));
    let fs = GitHubFs::new(repo);

    let err = fs.exists("/a.txt").await.unwrap_err();
    assert_eq!(err, FsError::transient("HTTP 503: Service Unavailable"));
    // Retrying a probe is safe.
    assert!(fs.exists("/a.txt").await.unwrap());
}

#[tokio::test]
async fn rate_limit_during_write_is_transient_and_changes_nothing() {
    let repo = InMemoryRepo::new();
    repo.fail_next(Error::from_status(403, true, "API rate limit exceeded"));
    let fs = GitHubFs::new(repo);

    let err = write(&fs, "/a.txt", "A").await.unwrap_err();
    assert!(err.is_transient());
    assert!(fs.api().paths().is_empty());
    assert!(fs.api().commit_messages().is_empty());
}

#[tokio::test]
async fn unauthorized_is_permanent() {
    let repo = InMemoryRepo::new();
    repo.fail_next(Error::from_status(401, false, "Bad credentials"));
    let fs = GitHubFs::new(repo);
    assert_eq!(
        fs.read("/a.txt").await.unwrap_err(),
        FsError::permanent("HTTP 401: Bad credentials")
    );
}

// =============================================================================
// Capability discovery
// =============================================================================

#[tokio::test]
async fn usable_through_capability_discovery() {
    let fs: Box<dyn FileSystem> = Box::new(GitHubFs::new(InMemoryRepo::new()));

    let writer = fs.as_writer().unwrap();
    let mut data: &[u8] = b"payload";
    writer.write("/x/y.txt", &mut data).await.unwrap();

    fs.as_renamer().unwrap().rename("/x/y.txt", "/x/z.txt").await.unwrap();
    fs.as_deleter().unwrap().delete("/x/z.txt").await.unwrap();
    assert!(!fs.exists("/x").await.unwrap());
}

#[tokio::test]
async fn commit_messages_name_the_operation() {
    let fs = GitHubFs::new(InMemoryRepo::new()).with_message_prefix("ftp");
    fs.mkdir("/d").await.unwrap();
    write(&fs, "/d/f", "1").await.unwrap();
    fs.rename("/d/f", "/d/g").await.unwrap();

    assert_eq!(
        fs.api().commit_messages(),
        vec![
            "ftp: mkdir /d",
            "ftp: create /d/f",
            "ftp: create /d/g",
            "ftp: delete /d/f",
        ]
    );
}
