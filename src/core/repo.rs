//! Git repository discovery, history and content access.
//!
//! Everything here shells out to the `git` executable and blocks; the async
//! [`GitService`](crate::core::GitService) layer moves these calls off the
//! caller's executor.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::Timer;

/// Maximum file size to load (50 MiB). Prevents OOM on huge files.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Hash of git's empty tree, used as the "before" side of a root commit.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Field and record separators used in `git log --format`.
const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

/// Errors from repository operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepoError {
    /// Path is not inside a git repository.
    #[error("not inside a git repository")]
    NotARepo,
    /// Git command failed with an error message.
    #[error("git command failed: {0}")]
    GitError(String),
    /// I/O error during git operation.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Git output or a working-tree file contained invalid UTF-8.
    #[error("invalid utf-8 content")]
    InvalidUtf8,
    /// Invalid revision specified.
    #[error("invalid revision: {0}")]
    InvalidRevision(String),
    /// The repository has no commits yet.
    #[error("initial commit was not performed")]
    NoInitialCommit,
    /// The revision exists but does not contain the path.
    #[error("path '{path}' does not exist in revision {revision}")]
    PathNotInRevision {
        /// Repository-relative path that was requested.
        path: String,
        /// Revision that was searched.
        revision: String,
    },
    /// File exceeds maximum allowed size.
    #[error("file too large: {size} bytes (max {max} bytes)")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },
}

/// Error when constructing a RelPath with an absolute path.
#[derive(Debug, Clone, thiserror::Error)]
#[error("path must be relative, got: {0}")]
pub struct InvalidRelPath(pub String);

/// Canonicalized path to a git repository root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    /// Discover the git repository containing the given path.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use revcompare::core::RepoRoot;
    /// use std::path::Path;
    ///
    /// let repo = RepoRoot::discover(Path::new(".")).expect("not in a git repo");
    /// println!("Repo at: {}", repo.path().display());
    /// ```
    #[must_use = "this returns a Result that should be checked"]
    pub fn discover(path: &Path) -> Result<Self, RepoError> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()?;

        if !output.status.success() {
            return Err(RepoError::NotARepo);
        }

        let root = std::str::from_utf8(&output.stdout)
            .map_err(|_| RepoError::InvalidUtf8)?
            .trim();

        let canonical = PathBuf::from(root)
            .canonicalize()
            .map_err(|_| RepoError::NotARepo)?;

        Ok(Self(canonical))
    }

    /// Get the repository root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Express an absolute or cwd-relative path relative to the repo root.
    ///
    /// Returns `None` for the root itself and an error for paths outside it.
    pub fn relativize(&self, path: &Path) -> Result<Option<RelPath>, RepoError> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let absolute = canonicalize_existing(&absolute);
        let rel = absolute
            .strip_prefix(&self.0)
            .map_err(|_| {
                RepoError::GitError(format!("{} is outside the repository", path.display()))
            })?;

        let rel = rel
            .to_str()
            .ok_or(RepoError::InvalidUtf8)?
            .trim_end_matches('/')
            .replace('\\', "/");
        if rel.is_empty() {
            Ok(None)
        } else {
            Ok(Some(RelPath::new(rel)))
        }
    }
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
///
/// Deleted files still resolve through symlinked parent directories.
fn canonicalize_existing(path: &Path) -> PathBuf {
    for ancestor in path.ancestors() {
        let Ok(canonical) = ancestor.canonicalize() else {
            continue;
        };
        return match path.strip_prefix(ancestor) {
            Ok(rest) if rest.as_os_str().is_empty() => canonical,
            Ok(rest) => canonical.join(rest),
            Err(_) => path.to_path_buf(),
        };
    }
    path.to_path_buf()
}

/// A repository-relative path. Never absolute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelPath(String);

impl RelPath {
    /// Create a new RelPath from a string.
    ///
    /// Returns an error if the path is absolute (starts with `/`).
    ///
    /// # Examples
    ///
    /// ```
    /// use revcompare::core::RelPath;
    ///
    /// let path = RelPath::try_new("src/main.rs").unwrap();
    /// assert_eq!(path.as_str(), "src/main.rs");
    /// assert!(RelPath::try_new("/absolute/path").is_err());
    /// ```
    #[must_use = "this returns a Result that should be checked"]
    pub fn try_new(path: impl Into<String>) -> Result<Self, InvalidRelPath> {
        let path = path.into();
        if path.starts_with('/') {
            return Err(InvalidRelPath(path));
        }
        Ok(Self(path))
    }

    /// Create a RelPath from trusted input (git output). Caller guarantees it is relative.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        debug_assert!(
            !path.starts_with('/'),
            "RelPath must not be absolute: {}",
            path
        );
        Self(path)
    }

    /// Get the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to an absolute path given a repo root.
    #[must_use]
    pub fn to_absolute(&self, root: &RepoRoot) -> PathBuf {
        root.path().join(&self.0)
    }

    /// The last path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Path segments, split on `/`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A commit in the history of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Full commit hash.
    pub id: String,
    /// Author name.
    pub author: String,
    /// Author email.
    pub email: String,
    /// Commit time.
    pub committed_at: DateTime<Utc>,
    /// First line of the commit message.
    pub message: String,
}

impl Revision {
    /// Abbreviated hash for display.
    #[must_use]
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    /// Multi-line description shown for the selected revision.
    pub fn describe(&self) -> String {
        format!(
            "Commit: {}\nAuthor: {} <{}>\nDate:   {}\n\n    {}",
            self.id,
            self.author,
            self.email,
            self.committed_at.format("%Y-%m-%d %H:%M:%S %Z"),
            self.message
        )
    }
}

/// Abbreviate a revision id to seven characters.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(7) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Output format of a diff request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffType {
    /// `<status>\0<path>\0` per changed file.
    #[default]
    NameStatus,
    /// `<path>\0` per changed file.
    NameOnly,
    /// Raw `git diff --raw` records.
    Raw,
}

impl DiffType {
    fn flag(self) -> &'static str {
        match self {
            DiffType::NameStatus => "--name-status",
            DiffType::NameOnly => "--name-only",
            DiffType::Raw => "--raw",
        }
    }
}

/// Parameters of a diff between two revisions.
///
/// A missing `revision_a` diffs from the empty tree; a missing `revision_b`
/// diffs against the working tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffRequest {
    /// Limit the diff to these paths. Empty means the whole repository.
    pub paths: Vec<RelPath>,
    /// Report format.
    pub diff_type: DiffType,
    /// Report renames as delete + add.
    pub no_renames: bool,
    /// Rename detection limit. Zero keeps git's default.
    pub rename_limit: usize,
    /// Older side of the comparison.
    pub revision_a: Option<String>,
    /// Newer side of the comparison.
    pub revision_b: Option<String>,
}

impl DiffRequest {
    /// A name-status diff between two revisions, without rename detection.
    pub fn name_status(
        paths: Vec<RelPath>,
        revision_a: Option<String>,
        revision_b: Option<String>,
    ) -> Self {
        Self {
            paths,
            diff_type: DiffType::NameStatus,
            no_renames: true,
            rename_limit: 0,
            revision_a,
            revision_b,
        }
    }

    fn to_args(&self) -> Vec<String> {
        let mut args = vec!["diff".to_string(), self.diff_type.flag().to_string()];
        // NUL-terminated records keep paths unquoted.
        if self.diff_type != DiffType::Raw {
            args.push("-z".to_string());
        }
        if self.no_renames {
            args.push("--no-renames".to_string());
        }
        if self.rename_limit > 0 {
            args.push(format!("-l{}", self.rename_limit));
        }
        args.push("--end-of-options".to_string());
        match (&self.revision_a, &self.revision_b) {
            (Some(a), Some(b)) => {
                args.push(a.clone());
                args.push(b.clone());
            }
            (Some(a), None) => args.push(a.clone()),
            (None, Some(b)) => {
                args.push(EMPTY_TREE.to_string());
                args.push(b.clone());
            }
            (None, None) => {}
        }
        args.push("--".to_string());
        args.extend(self.paths.iter().map(|p| p.as_str().to_string()));
        args
    }
}

/// Run git in the repository root and return stdout.
fn run_git<I, S>(root: &RepoRoot, args: I) -> Result<Vec<u8>, RepoError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = Command::new("git")
        .args(args)
        .current_dir(root.path())
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RepoError::GitError(stderr.trim().to_string()));
    }

    Ok(output.stdout)
}

/// Whether HEAD points at a commit.
#[must_use = "this returns a Result that should be checked"]
pub fn has_commits(root: &RepoRoot) -> Result<bool, RepoError> {
    let status = Command::new("git")
        .args(["rev-parse", "--verify", "--quiet", "HEAD"])
        .current_dir(root.path())
        .output()?
        .status;
    Ok(status.success())
}

/// List the revisions touching `path` (or the whole repository), newest first.
#[must_use = "this returns a Result that should be checked"]
pub fn list_revisions(root: &RepoRoot, path: Option<&RelPath>) -> Result<Vec<Revision>, RepoError> {
    let _timer = Timer::start("git log");

    if !has_commits(root)? {
        return Err(RepoError::NoInitialCommit);
    }

    let mut args = vec![
        "log".to_string(),
        "--format=%H%x1f%an%x1f%ae%x1f%ct%x1f%s%x1e".to_string(),
        "--".to_string(),
    ];
    if let Some(path) = path {
        args.push(path.as_str().to_string());
    }

    let stdout = run_git(root, &args)?;
    parse_log(&stdout)
}

/// Parse `git log` output in the record format used by [`list_revisions`].
fn parse_log(output: &[u8]) -> Result<Vec<Revision>, RepoError> {
    let text = std::str::from_utf8(output).map_err(|_| RepoError::InvalidUtf8)?;
    let mut revisions = Vec::new();

    for record in text.split(RECORD_SEP) {
        let record = record.trim_start_matches('\n');
        if record.is_empty() {
            continue;
        }

        let fields: Vec<&str> = record.splitn(5, FIELD_SEP).collect();
        let [id, author, email, timestamp, message] = fields.as_slice() else {
            return Err(RepoError::GitError(format!("malformed log record: {record:?}")));
        };

        let seconds: i64 = timestamp
            .parse()
            .map_err(|_| RepoError::GitError(format!("invalid commit time: {timestamp}")))?;
        let committed_at = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| RepoError::GitError(format!("invalid commit time: {timestamp}")))?;

        revisions.push(Revision {
            id: id.to_string(),
            author: author.to_string(),
            email: email.to_string(),
            committed_at,
            message: message.trim_end().to_string(),
        });
    }

    Ok(revisions)
}

/// Run a diff and return the textual report.
#[must_use = "this returns a Result that should be checked"]
pub fn diff(root: &RepoRoot, request: &DiffRequest) -> Result<String, RepoError> {
    let _timer = Timer::start("git diff");
    let stdout = run_git(root, request.to_args())?;
    String::from_utf8(stdout).map_err(|_| RepoError::InvalidUtf8)
}

/// Resolve a revision to its full SHA.
#[must_use = "this returns a Result that should be checked"]
pub fn resolve_revision(root: &RepoRoot, revision: &str) -> Result<String, RepoError> {
    let output = Command::new("git")
        .args(["rev-parse", "--verify", "--quiet", "--end-of-options"])
        .arg(format!("{revision}^{{commit}}"))
        .current_dir(root.path())
        .output()?;

    if !output.status.success() {
        return Err(RepoError::InvalidRevision(revision.to_string()));
    }

    Ok(std::str::from_utf8(&output.stdout)
        .map_err(|_| RepoError::InvalidUtf8)?
        .trim()
        .to_string())
}

/// Get the size of a blob at a given revision without reading it.
fn get_blob_size(root: &RepoRoot, revision: &str, path: &RelPath) -> Result<Option<u64>, RepoError> {
    let output = Command::new("git")
        .args(["cat-file", "-s", &format!("{}:{}", revision, path.as_str())])
        .current_dir(root.path())
        .output()?;

    if !output.status.success() {
        return Ok(None);
    }

    let size_str = std::str::from_utf8(&output.stdout)
        .map_err(|_| RepoError::InvalidUtf8)?
        .trim();

    size_str.parse::<u64>().map(Some).map_err(|_| {
        RepoError::GitError(format!("invalid size from git cat-file -s: {}", size_str))
    })
}

/// Load a file's content at a revision.
///
/// Distinguishes a revision that lacks the path ([`RepoError::PathNotInRevision`])
/// from a revision that does not exist ([`RepoError::InvalidRevision`]).
#[must_use = "this returns a Result that should be checked"]
pub fn show_file_content(root: &RepoRoot, path: &RelPath, revision: &str) -> Result<Vec<u8>, RepoError> {
    let _timer = Timer::start("git show");

    let Some(size) = get_blob_size(root, revision, path)? else {
        resolve_revision(root, revision)?;
        return Err(RepoError::PathNotInRevision {
            path: path.to_string(),
            revision: revision.to_string(),
        });
    };
    if size > MAX_FILE_SIZE {
        return Err(RepoError::FileTooLarge {
            size,
            max: MAX_FILE_SIZE,
        });
    }

    run_git(root, ["show", &format!("{}:{}", revision, path.as_str())])
}

/// Read a file from the working tree.
///
/// Returns `None` for missing files, directories and symlinks.
#[must_use = "this returns a Result that should be checked"]
pub fn read_working_file(root: &RepoRoot, path: &RelPath) -> Result<Option<Vec<u8>>, RepoError> {
    let full_path = path.to_absolute(root);

    // symlink_metadata so links never escape the repo.
    match std::fs::symlink_metadata(&full_path) {
        Ok(meta) if meta.is_file() => {
            if meta.len() > MAX_FILE_SIZE {
                return Err(RepoError::FileTooLarge {
                    size: meta.len(),
                    max: MAX_FILE_SIZE,
                });
            }
        }
        Ok(_) => return Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    match std::fs::read(&full_path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite a working-tree file, creating parent directories as needed.
#[must_use = "this returns a Result that should be checked"]
pub fn write_working_file(root: &RepoRoot, path: &RelPath, content: &[u8]) -> Result<(), RepoError> {
    let full_path = path.to_absolute(root);
    if let Some(parent) = full_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full_path, content)?;
    Ok(())
}
