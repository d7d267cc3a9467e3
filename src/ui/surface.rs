//! The presentation boundary the workflows report to.

use crate::ui::CompareRequest;

/// User-facing texts of the history and compare dialogs.
pub mod messages {
    /// Title of the history dialog and of its modal messages.
    pub const COMPARE_WITH_REVISION_TITLE: &str = "Compare with revision";
    /// Shown when the repository has no commits.
    pub const INIT_COMMIT_WAS_NOT_PERFORMED: &str = "Initial commit was not performed";
    /// Notification when listing revisions fails.
    pub const LOG_FAILED: &str = "Log failed";
    /// Notification when the diff between revisions fails.
    pub const DIFF_FAILED: &str = "Diff failed";
    /// Title of the identical-content message.
    pub const IDENTICAL_CONTENT_TITLE: &str = "Identical content";
    /// Body of the identical-content message.
    pub const IDENTICAL_CONTENT_TEXT: &str = "There are no differences between the selected revisions";
    /// Description shown while no revision is selected.
    pub const NO_REVISION_SELECTED: &str = "Select a revision to see its full description";
    /// Label of the view-mode button while the list view is shown.
    pub const GROUP_BY_DIRECTORY: &str = "Group by directory";
    /// Label of the view-mode button while the tree view is shown.
    pub const LIST_VIEW: &str = "List view";
}

/// Receives everything the workflows want shown to the user.
pub trait Surface {
    /// Show a modal message dialog.
    fn show_message(&mut self, title: &str, text: &str);

    /// Show a transient failure notification.
    fn notify_failure(&mut self, message: &str);

    /// Open the compare dialog for a prepared request.
    fn open_compare(&mut self, request: CompareRequest);
}
