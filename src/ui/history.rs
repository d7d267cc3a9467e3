//! Revision history dialog: pick a revision and compare it with its predecessor.

use std::rc::Rc;

use crate::core::{
    is_blank_report, parse_change_set, DiffRequest, GitService, RelPath, RepoError, Revision,
};
use crate::metrics;
use crate::ui::compare::content_or_empty;
use crate::ui::{
    messages, ChangedListWorkflow, CompareOutcome, CompareRequest, CompareSide, Surface,
    WorkflowError,
};

/// The two revisions a history compare runs between, captured at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPair {
    /// Predecessor of the selected revision.
    pub revision_a: String,
    /// The selected revision.
    pub revision_b: String,
    /// Path the history was opened for; `None` for the whole repository.
    pub path: Option<RelPath>,
}

/// State of the "Compare with revision" dialog.
#[derive(Debug)]
pub struct HistoryWorkflow<S> {
    service: Rc<S>,
    path: Option<RelPath>,
    revisions: Vec<Revision>,
    selected: Option<usize>,
    open: bool,
    description: String,
    changed_list: ChangedListWorkflow<S>,
}

impl<S: GitService> HistoryWorkflow<S> {
    /// Create a closed dialog.
    pub fn new(service: Rc<S>) -> Self {
        Self {
            changed_list: ChangedListWorkflow::new(Rc::clone(&service)),
            service,
            path: None,
            revisions: Vec::new(),
            selected: None,
            open: false,
            description: messages::NO_REVISION_SELECTED.to_string(),
        }
    }

    /// List the revisions touching `path` and open the dialog.
    ///
    /// Returns whether the dialog opened. Failures are reported to `surface`.
    pub async fn show(&mut self, path: Option<RelPath>, surface: &mut impl Surface) -> bool {
        let path = path.filter(|p| !p.as_str().is_empty());
        match self.service.log(path.as_ref()).await {
            Ok(revisions) => {
                tracing::debug!(count = revisions.len(), path = ?path, "history loaded");
                self.path = path;
                self.revisions = revisions;
                self.open = true;
                self.unselect_revision();
                true
            }
            Err(RepoError::NoInitialCommit) => {
                tracing::warn!("history requested on a repository without commits");
                surface.show_message(
                    messages::COMPARE_WITH_REVISION_TITLE,
                    messages::INIT_COMMIT_WAS_NOT_PERFORMED,
                );
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "listing revisions failed");
                surface.notify_failure(messages::LOG_FAILED);
                false
            }
        }
    }

    /// Whether the dialog is shown.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Path the history is shown for.
    pub fn path(&self) -> Option<&RelPath> {
        self.path.as_ref()
    }

    /// Listed revisions, newest first.
    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// Index of the selected revision.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select the revision at `index`. Out-of-range indices clear the selection.
    pub fn select_revision(&mut self, index: usize) -> bool {
        match self.revisions.get(index) {
            Some(revision) => {
                self.description = revision.describe();
                self.selected = Some(index);
                true
            }
            None => {
                self.unselect_revision();
                false
            }
        }
    }

    /// Clear the selection.
    pub fn unselect_revision(&mut self) {
        self.selected = None;
        self.description = messages::NO_REVISION_SELECTED.to_string();
    }

    /// Full description of the selected revision.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the compare button is enabled.
    pub fn compare_enabled(&self) -> bool {
        self.open && self.selected.is_some()
    }

    /// Close the dialog and drop the selection.
    pub fn close(&mut self) {
        self.open = false;
        self.unselect_revision();
    }

    /// The changed-file list multi-file compares hand off to.
    pub fn changed_list(&self) -> &ChangedListWorkflow<S> {
        &self.changed_list
    }

    /// Mutable access to the changed-file list.
    pub fn changed_list_mut(&mut self) -> &mut ChangedListWorkflow<S> {
        &mut self.changed_list
    }

    /// Revisions a compare would run between.
    pub fn revision_pair(&self) -> Result<Option<RevisionPair>, WorkflowError> {
        let Some(index) = self.selected else {
            return Ok(None);
        };
        let (Some(selected), Some(predecessor)) =
            (self.revisions.get(index), self.revisions.get(index + 1))
        else {
            return Err(WorkflowError::NoPredecessor);
        };
        Ok(Some(RevisionPair {
            revision_a: predecessor.id.clone(),
            revision_b: selected.id.clone(),
            path: self.path.clone(),
        }))
    }

    /// Compare the selected revision with its predecessor.
    pub async fn compare(&mut self, surface: &mut impl Surface) -> CompareOutcome {
        if !self.open {
            return CompareOutcome::NotReady;
        }
        let pair = match self.revision_pair() {
            Ok(Some(pair)) => pair,
            Ok(None) => return CompareOutcome::NotReady,
            Err(e) => {
                tracing::warn!(error = %e, "compare requested for the oldest revision");
                surface.notify_failure(&e.to_string());
                return CompareOutcome::Failed;
            }
        };

        let request = DiffRequest::name_status(
            pair.path.iter().cloned().collect(),
            Some(pair.revision_a.clone()),
            Some(pair.revision_b.clone()),
        );
        let report = {
            let _timer = metrics::Timer::start("history_diff");
            self.service.diff(&request).await
        };
        let report = match report {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "diff between revisions failed");
                surface.notify_failure(messages::DIFF_FAILED);
                return CompareOutcome::Failed;
            }
        };

        if is_blank_report(&report) {
            tracing::info!(a = %pair.revision_a, b = %pair.revision_b, "revisions identical");
            surface.show_message(
                messages::IDENTICAL_CONTENT_TITLE,
                messages::IDENTICAL_CONTENT_TEXT,
            );
            return CompareOutcome::Identical;
        }

        let changes = parse_change_set(&report);
        match changes.len() {
            0 => {
                tracing::warn!(bytes = report.len(), "diff report has no readable entries");
                surface.notify_failure(messages::DIFF_FAILED);
                CompareOutcome::Failed
            }
            1 => {
                let Some(path) = changes.into_keys().next() else {
                    return CompareOutcome::Failed;
                };
                match self.single_file(path, &pair).await {
                    Ok(request) => {
                        tracing::info!(path = request.path.as_str(), "opening compare");
                        surface.open_compare(request);
                        CompareOutcome::Opened
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "fetching revision content failed");
                        surface.notify_failure(&e.to_string());
                        CompareOutcome::Failed
                    }
                }
            }
            count => {
                tracing::info!(count, "several files changed, showing changed list");
                match self.changed_list.show(
                    changes,
                    Some(pair.revision_a),
                    Some(pair.revision_b),
                ) {
                    Ok(()) => CompareOutcome::ChangedList,
                    Err(e) => {
                        surface.notify_failure(&e.to_string());
                        CompareOutcome::Failed
                    }
                }
            }
        }
    }

    async fn single_file(&self, path: RelPath, pair: &RevisionPair) -> Result<CompareRequest, RepoError> {
        let service = self.service.as_ref();
        let left_content = content_or_empty(service, &path, &pair.revision_a).await?;
        let right_content = content_or_empty(service, &path, &pair.revision_b).await?;
        Ok(CompareRequest {
            path,
            left: CompareSide::Revision(pair.revision_a.clone()),
            right: CompareSide::Revision(pair.revision_b.clone()),
            left_content,
            right_content,
            read_only: true,
        })
    }
}
