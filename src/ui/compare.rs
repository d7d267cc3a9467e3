//! Two-pane compare dialog state.

use crate::core::{short_id, ContentDiff, GitService, RelPath, RepoError, TextBuffer, DEFAULT_CONTEXT};
use crate::ui::Surface;

/// Where one side of a compare comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareSide {
    /// Content of a committed revision.
    Revision(String),
    /// The live working-tree file.
    WorkingTree,
    /// Nothing, e.g. before the file was added.
    Empty,
}

impl CompareSide {
    /// Column title for this side.
    pub fn title(&self) -> String {
        match self {
            CompareSide::Revision(id) => short_id(id).to_string(),
            CompareSide::WorkingTree => "Working tree".to_string(),
            CompareSide::Empty => "Empty".to_string(),
        }
    }
}

/// Everything the compare dialog needs to show one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    /// File being compared.
    pub path: RelPath,
    /// Origin of the left (older) content.
    pub left: CompareSide,
    /// Origin of the right (newer) content.
    pub right: CompareSide,
    /// Left-hand content.
    pub left_content: String,
    /// Right-hand content.
    pub right_content: String,
    /// Whether the right-hand side may be edited.
    pub read_only: bool,
}

/// Result of closing a compare dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOutcome {
    /// The request the dialog was showing.
    pub request: CompareRequest,
    /// Right-hand content at close time.
    pub edited_content: String,
    /// Whether `edited_content` differs from what was shown.
    pub changed: bool,
}

impl CloseOutcome {
    /// Whether the edit should be written back to the working tree.
    ///
    /// Binary content is never written back.
    pub fn needs_write_back(&self) -> bool {
        self.changed
            && !self.request.read_only
            && self.request.right == CompareSide::WorkingTree
            && !TextBuffer::new(self.request.right_content.as_bytes()).is_binary()
            && !TextBuffer::new(self.edited_content.as_bytes()).is_binary()
    }
}

#[derive(Debug)]
struct Shown {
    request: CompareRequest,
    diff: Option<ContentDiff>,
}

/// Holds the compare currently on screen.
#[derive(Debug)]
pub struct CompareDialog {
    context: usize,
    shown: Option<Shown>,
}

impl Default for CompareDialog {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT)
    }
}

impl CompareDialog {
    /// Create a closed dialog that keeps `context` lines around hunks.
    pub fn new(context: usize) -> Self {
        Self {
            context,
            shown: None,
        }
    }

    /// Show a request, replacing whatever was open. Binary content is not line-diffed.
    pub fn show(&mut self, request: CompareRequest) {
        let old = TextBuffer::new(request.left_content.as_bytes());
        let new = TextBuffer::new(request.right_content.as_bytes());
        let diff = if old.is_binary() || new.is_binary() {
            None
        } else {
            Some(ContentDiff::compute_with_context(&old, &new, self.context))
        };
        tracing::debug!(path = request.path.as_str(), read_only = request.read_only, "compare shown");
        self.shown = Some(Shown { request, diff });
    }

    /// Whether a request is shown.
    pub fn is_open(&self) -> bool {
        self.shown.is_some()
    }

    /// The shown request.
    pub fn request(&self) -> Option<&CompareRequest> {
        self.shown.as_ref().map(|s| &s.request)
    }

    /// Window title: the file path.
    pub fn title(&self) -> Option<&str> {
        self.request().map(|r| r.path.as_str())
    }

    /// Left and right column titles.
    pub fn column_titles(&self) -> Option<(String, String)> {
        self.request().map(|r| (r.left.title(), r.right.title()))
    }

    /// Line diff of the shown contents; `None` when closed or binary.
    pub fn diff(&self) -> Option<&ContentDiff> {
        self.shown.as_ref().and_then(|s| s.diff.as_ref())
    }

    /// Whether either side looks binary.
    pub fn is_binary(&self) -> bool {
        self.shown.as_ref().is_some_and(|s| s.diff.is_none())
    }

    /// Whether the two sides differ.
    pub fn has_changes(&self) -> bool {
        match &self.shown {
            Some(Shown {
                diff: Some(diff), ..
            }) => diff.has_changes(),
            Some(Shown { request, .. }) => request.left_content != request.right_content,
            None => false,
        }
    }

    /// Close with the right-hand content as edited by the user.
    ///
    /// Returns `None` if nothing was shown.
    pub fn close(&mut self, edited_content: String) -> Option<CloseOutcome> {
        let Shown { request, .. } = self.shown.take()?;
        let changed = edited_content != request.right_content;
        Some(CloseOutcome {
            request,
            edited_content,
            changed,
        })
    }

    /// Close without edits.
    pub fn dismiss(&mut self) -> Option<CloseOutcome> {
        let content = self.request()?.right_content.clone();
        self.close(content)
    }
}

/// Write an edited working-tree compare back to disk.
///
/// Returns whether a write happened. Failures are reported to the surface.
pub async fn write_back<S: GitService>(
    service: &S,
    outcome: &CloseOutcome,
    surface: &mut impl Surface,
) -> bool {
    if !outcome.needs_write_back() {
        return false;
    }
    let path = &outcome.request.path;
    match service.write_working_file(path, &outcome.edited_content).await {
        Ok(()) => {
            tracing::info!(path = path.as_str(), "saved compare edits");
            true
        }
        Err(e) => {
            tracing::warn!(path = path.as_str(), error = %e, "failed to save compare edits");
            surface.notify_failure(&e.to_string());
            false
        }
    }
}

/// Content at `revision`, or empty when the revision does not contain the path.
pub(crate) async fn content_or_empty<S: GitService>(
    service: &S,
    path: &RelPath,
    revision: &str,
) -> Result<String, RepoError> {
    match service.show_file_content(path, revision).await {
        Err(RepoError::PathNotInRevision { .. }) => {
            tracing::debug!(path = path.as_str(), revision, "path not in revision, using empty content");
            Ok(String::new())
        }
        other => other,
    }
}
