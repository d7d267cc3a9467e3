//! Changed-file list: pick one file of a multi-file change and compare it.

use std::rc::Rc;

use crate::core::{
    find_file, render_nodes, set_all_expanded, visible_rows, ChangeNode, ChangeSet, ChangeStatus,
    GitService, NodeRow, RelPath, RepoError, TextBuffer, ViewMode,
};
use crate::ui::compare::content_or_empty;
use crate::ui::{
    messages, write_back, CloseOutcome, CompareOutcome, CompareRequest, CompareSide, Surface,
    WorkflowError,
};

/// The file a compare will be run for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    /// Selected file.
    pub path: RelPath,
    /// How it changed.
    pub status: ChangeStatus,
}

/// Revision bounds captured when a compare starts.
#[derive(Debug, Clone)]
enum Bounds {
    /// Compare against the empty initial state.
    InitialCommit { revision_b: String },
    /// Compare a revision against the working tree.
    WithLatest { revision_a: String },
    /// Compare two revisions.
    Between { revision_a: String, revision_b: String },
}

/// State of the changed-file dialog.
#[derive(Debug)]
pub struct ChangedListWorkflow<S> {
    service: Rc<S>,
    changes: ChangeSet,
    revision_a: Option<String>,
    revision_b: Option<String>,
    view_mode: ViewMode,
    nodes: Vec<ChangeNode>,
    selection: Option<FileSelection>,
    open: bool,
}

impl<S: GitService> ChangedListWorkflow<S> {
    /// Create a closed dialog in list mode.
    pub fn new(service: Rc<S>) -> Self {
        Self {
            service,
            changes: ChangeSet::new(),
            revision_a: None,
            revision_b: None,
            view_mode: ViewMode::default(),
            nodes: Vec::new(),
            selection: None,
            open: false,
        }
    }

    /// Show a change set.
    ///
    /// A missing `revision_a` compares against the empty initial state, a
    /// missing `revision_b` against the working tree. At least one is required.
    pub fn show(
        &mut self,
        changes: ChangeSet,
        revision_a: Option<String>,
        revision_b: Option<String>,
    ) -> Result<(), WorkflowError> {
        if revision_a.is_none() && revision_b.is_none() {
            return Err(WorkflowError::NoRevisions);
        }
        tracing::debug!(files = changes.len(), ?revision_a, ?revision_b, "show changed files");

        self.changes = changes;
        self.revision_a = revision_a;
        self.revision_b = revision_b;
        self.selection = None;
        self.open = true;
        self.render();
        Ok(())
    }

    /// Close the dialog.
    pub fn close(&mut self) {
        self.open = false;
        self.selection = None;
    }

    /// Whether the dialog is shown.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The change set being shown.
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Older revision bound.
    pub fn revision_a(&self) -> Option<&str> {
        self.revision_a.as_deref()
    }

    /// Newer revision bound.
    pub fn revision_b(&self) -> Option<&str> {
        self.revision_b.as_deref()
    }

    /// Current layout.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Switch between list and tree, re-rendering.
    pub fn toggle_view_mode(&mut self) {
        self.set_view_mode(self.view_mode.toggled());
    }

    /// Set the layout. Re-renders only when the mode changes.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            self.view_mode = mode;
            self.render();
        }
    }

    /// Label of the button that switches the layout.
    pub fn view_mode_button_label(&self) -> &'static str {
        match self.view_mode {
            ViewMode::List => messages::GROUP_BY_DIRECTORY,
            ViewMode::Tree => messages::LIST_VIEW,
        }
    }

    /// Expand/collapse only make sense for the tree.
    pub fn expand_collapse_enabled(&self) -> bool {
        self.view_mode == ViewMode::Tree
    }

    /// Expand every folder.
    pub fn expand_all(&mut self) {
        set_all_expanded(&mut self.nodes, true);
    }

    /// Collapse every folder.
    pub fn collapse_all(&mut self) {
        set_all_expanded(&mut self.nodes, false);
    }

    /// Rendered nodes in the current layout.
    pub fn nodes(&self) -> &[ChangeNode] {
        &self.nodes
    }

    /// Visible rows with their depth.
    pub fn rows(&self) -> Vec<NodeRow<'_>> {
        visible_rows(&self.nodes)
    }

    /// Select a node. Compare is enabled only for files.
    pub fn select_node(&mut self, node: &ChangeNode) -> bool {
        match node {
            ChangeNode::File { path, status, .. } => {
                self.selection = Some(FileSelection {
                    path: path.clone(),
                    status: *status,
                });
                true
            }
            ChangeNode::Folder { .. } => {
                self.selection = None;
                false
            }
        }
    }

    /// Select the file node for `path`, if it is part of the change set.
    pub fn select_path(&mut self, path: &RelPath) -> bool {
        match find_file(&self.nodes, path).cloned() {
            Some(node) => self.select_node(&node),
            None => false,
        }
    }

    /// Current selection.
    pub fn selection(&self) -> Option<&FileSelection> {
        self.selection.as_ref()
    }

    /// Whether the compare button is enabled.
    pub fn compare_enabled(&self) -> bool {
        self.open && self.selection.is_some()
    }

    fn render(&mut self) {
        self.nodes = render_nodes(&self.changes, self.view_mode);
    }

    fn bounds(&self) -> Option<Bounds> {
        match (self.revision_a.clone(), self.revision_b.clone()) {
            (None, Some(revision_b)) => Some(Bounds::InitialCommit { revision_b }),
            (Some(revision_a), None) => Some(Bounds::WithLatest { revision_a }),
            (Some(revision_a), Some(revision_b)) => Some(Bounds::Between {
                revision_a,
                revision_b,
            }),
            (None, None) => None,
        }
    }

    /// Compare the selected file and open the result on the surface.
    pub async fn compare(&mut self, surface: &mut impl Surface) -> CompareOutcome {
        if !self.compare_enabled() {
            return CompareOutcome::NotReady;
        }
        let (Some(selection), Some(bounds)) = (self.selection.clone(), self.bounds()) else {
            surface.notify_failure(&WorkflowError::NoRevisions.to_string());
            return CompareOutcome::Failed;
        };

        match self.prepare(&selection.path, bounds).await {
            Ok(Some(request)) => {
                tracing::info!(path = selection.path.as_str(), "opening compare");
                surface.open_compare(request);
                CompareOutcome::Opened
            }
            Ok(None) => {
                tracing::info!(path = selection.path.as_str(), "working file missing, compare skipped");
                CompareOutcome::Skipped
            }
            Err(e) => {
                tracing::warn!(path = selection.path.as_str(), error = %e, "compare failed");
                surface.notify_failure(&e.to_string());
                CompareOutcome::Failed
            }
        }
    }

    async fn prepare(&self, path: &RelPath, bounds: Bounds) -> Result<Option<CompareRequest>, RepoError> {
        let service = self.service.as_ref();
        let request = match bounds {
            Bounds::InitialCommit { revision_b } => CompareRequest {
                path: path.clone(),
                right_content: service.show_file_content(path, &revision_b).await?,
                left: CompareSide::Empty,
                right: CompareSide::Revision(revision_b),
                left_content: String::new(),
                read_only: true,
            },
            Bounds::WithLatest { revision_a } => {
                let Some(right_content) = service.working_file(path).await? else {
                    return Ok(None);
                };
                CompareRequest {
                    path: path.clone(),
                    left_content: content_or_empty(service, path, &revision_a).await?,
                    left: CompareSide::Revision(revision_a),
                    right: CompareSide::WorkingTree,
                    read_only: TextBuffer::new(right_content.as_bytes()).is_binary(),
                    right_content,
                }
            }
            Bounds::Between {
                revision_a,
                revision_b,
            } => {
                let left_content = content_or_empty(service, path, &revision_a).await?;
                let right_content = content_or_empty(service, path, &revision_b).await?;
                CompareRequest {
                    path: path.clone(),
                    left: CompareSide::Revision(revision_a),
                    right: CompareSide::Revision(revision_b),
                    left_content,
                    right_content,
                    read_only: true,
                }
            }
        };
        Ok(Some(request))
    }

    /// Handle the compare dialog closing; saves edits made to the working tree.
    pub async fn compare_closed(&self, outcome: &CloseOutcome, surface: &mut impl Surface) -> bool {
        write_back(self.service.as_ref(), outcome, surface).await
    }
}
