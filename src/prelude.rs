//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust,ignore
//! use revcompare::prelude::*;
//! ```

pub use crate::core::{
    ChangeNode, ChangeSet, ChangeStatus, GitCli, GitService, RelPath, RepoError, RepoRoot,
    Revision, Settings, ViewMode,
};
pub use crate::ui::{
    ChangedListWorkflow, CloseOutcome, CompareDialog, CompareOutcome, CompareRequest, CompareSide,
    HistoryWorkflow, Surface, WorkflowError,
};
