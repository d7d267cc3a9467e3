//! Async access to the version-control backend.

use crate::core::{
    diff, list_revisions, read_working_file, show_file_content, write_working_file, DiffRequest,
    RelPath, RepoError, RepoRoot, Revision,
};

/// Operations the history and compare workflows need from a repository.
///
/// Implementations resolve on the caller's executor; the workflows await
/// each call before issuing the next one.
#[allow(async_fn_in_trait)]
pub trait GitService {
    /// Revisions touching `path` (all of them when `None`), newest first.
    ///
    /// Fails with [`RepoError::NoInitialCommit`] on an empty repository.
    async fn log(&self, path: Option<&RelPath>) -> Result<Vec<Revision>, RepoError>;

    /// Textual diff report for the request.
    async fn diff(&self, request: &DiffRequest) -> Result<String, RepoError>;

    /// File content at a revision.
    ///
    /// Fails with [`RepoError::PathNotInRevision`] when the revision lacks the path.
    async fn show_file_content(&self, path: &RelPath, revision: &str) -> Result<String, RepoError>;

    /// Current working-tree content, or `None` if the file does not exist.
    ///
    /// Fails with [`RepoError::InvalidUtf8`] when the file is not valid UTF-8.
    async fn working_file(&self, path: &RelPath) -> Result<Option<String>, RepoError>;

    /// Replace the working-tree content of a file.
    async fn write_working_file(&self, path: &RelPath, content: &str) -> Result<(), RepoError>;
}

/// [`GitService`] backed by the `git` executable.
///
/// Each call runs on Tokio's blocking pool, so a Tokio runtime must be active.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: RepoRoot,
}

impl GitCli {
    /// Serve the repository at `root`.
    pub fn new(root: RepoRoot) -> Self {
        Self { root }
    }

    /// The repository root.
    pub fn root(&self) -> &RepoRoot {
        &self.root
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, RepoError>
    where
        F: FnOnce(&RepoRoot) -> Result<T, RepoError> + Send + 'static,
        T: Send + 'static,
    {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || f(&root))
            .await
            .map_err(|e| RepoError::GitError(format!("git task failed: {e}")))?
    }
}

impl GitService for GitCli {
    async fn log(&self, path: Option<&RelPath>) -> Result<Vec<Revision>, RepoError> {
        tracing::debug!(path = ?path.map(RelPath::as_str), "git log");
        let path = path.cloned();
        self.blocking(move |root| list_revisions(root, path.as_ref()))
            .await
    }

    async fn diff(&self, request: &DiffRequest) -> Result<String, RepoError> {
        tracing::debug!(
            a = ?request.revision_a,
            b = ?request.revision_b,
            paths = request.paths.len(),
            "git diff"
        );
        let request = request.clone();
        self.blocking(move |root| diff(root, &request)).await
    }

    async fn show_file_content(&self, path: &RelPath, revision: &str) -> Result<String, RepoError> {
        tracing::debug!(path = path.as_str(), revision, "git show");
        let path = path.clone();
        let revision = revision.to_string();
        let bytes = self
            .blocking(move |root| show_file_content(root, &path, &revision))
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn working_file(&self, path: &RelPath) -> Result<Option<String>, RepoError> {
        let path = path.clone();
        let bytes = self
            .blocking(move |root| read_working_file(root, &path))
            .await?;
        // Strict decode: this side can be edited and written back.
        bytes
            .map(|b| String::from_utf8(b).map_err(|_| RepoError::InvalidUtf8))
            .transpose()
    }

    async fn write_working_file(&self, path: &RelPath, content: &str) -> Result<(), RepoError> {
        tracing::debug!(path = path.as_str(), bytes = content.len(), "write working file");
        let path = path.clone();
        let content = content.to_string();
        self.blocking(move |root| write_working_file(root, &path, content.as_bytes()))
            .await
    }
}
