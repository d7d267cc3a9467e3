//! History and compare workflows, independent of any rendering toolkit.
//!
//! Workflows own their selection state, call a [`GitService`](crate::core::GitService)
//! and report results to a [`Surface`].

mod changed_list;
mod compare;
mod history;
mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use changed_list::{ChangedListWorkflow, FileSelection};
pub use compare::{write_back, CloseOutcome, CompareDialog, CompareRequest, CompareSide};
pub use history::{HistoryWorkflow, RevisionPair};
pub use surface::{messages, Surface};

use thiserror::Error;

use crate::core::RepoError;

/// Failures a workflow reports instead of acting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkflowError {
    /// The oldest revision was selected, so there is nothing to diff against.
    #[error("selected revision has no predecessor to compare with")]
    NoPredecessor,
    /// A changed-file list was shown without either revision bound.
    #[error("at least one revision is required to compare changes")]
    NoRevisions,
    /// The backend failed.
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// What a compare request ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOutcome {
    /// Nothing selected; compare is disabled.
    NotReady,
    /// The revisions do not differ for the path.
    Identical,
    /// A compare dialog was opened.
    Opened,
    /// Several files changed; the changed-file list took over.
    ChangedList,
    /// The working-tree file is gone; nothing to compare.
    Skipped,
    /// A failure was reported to the surface.
    Failed,
}
