//! Change statuses and parsing of name-status diff reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::RelPath;

/// How a file changed between two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeStatus {
    /// File was newly added.
    Added,
    /// File was modified.
    Modified,
    /// File was deleted.
    Deleted,
    /// File was renamed.
    Renamed,
    /// File was copied.
    Copied,
    /// File type changed (e.g. regular file to symlink).
    TypeChanged,
    /// File has unresolved merge conflicts.
    Unmerged,
    /// File is not tracked.
    Untracked,
}

impl ChangeStatus {
    /// Map a git status letter. Unknown letters count as modifications.
    pub fn from_code(code: char) -> Self {
        match code.to_ascii_uppercase() {
            'A' => Self::Added,
            'D' => Self::Deleted,
            'R' => Self::Renamed,
            'C' => Self::Copied,
            'T' => Self::TypeChanged,
            'U' => Self::Unmerged,
            '?' => Self::Untracked,
            _ => Self::Modified,
        }
    }

    /// Single-letter label, as git prints it.
    pub fn label(self) -> &'static str {
        match self {
            Self::Added => "A",
            Self::Modified => "M",
            Self::Deleted => "D",
            Self::Renamed => "R",
            Self::Copied => "C",
            Self::TypeChanged => "T",
            Self::Unmerged => "U",
            Self::Untracked => "?",
        }
    }
}

/// Changed files keyed by path, in path order.
pub type ChangeSet = BTreeMap<RelPath, ChangeStatus>;

/// One parsed line of a name-status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    /// Path of the changed file. For renames and copies, the new path.
    pub path: RelPath,
    /// Kind of change.
    pub status: ChangeStatus,
}

/// Parse a single `"<status><ws><path>"` line.
///
/// Accepts git's tab separator as well as a single space. Rename and copy
/// records (`R100\told\tnew`) resolve to the new path.
pub fn parse_name_status_line(line: &str) -> Option<ChangeEntry> {
    let line = line.trim_end_matches('\r');
    let code = line.chars().next()?;
    let rest = line.split_once(['\t', ' '])?.1;

    let path = match ChangeStatus::from_code(code) {
        ChangeStatus::Renamed | ChangeStatus::Copied if rest.contains('\t') => {
            rest.rsplit('\t').next().unwrap_or(rest)
        }
        _ => rest,
    };
    if path.is_empty() {
        return None;
    }

    Some(ChangeEntry {
        path: RelPath::new(path),
        status: ChangeStatus::from_code(code),
    })
}

/// Parse a name-status report into entries, in report order.
///
/// Reports produced with `-z` (NUL-terminated fields, paths unquoted) are
/// detected by their NUL bytes. Otherwise the report is read line by line and
/// blank lines are skipped.
pub fn parse_name_status(report: &str) -> Vec<ChangeEntry> {
    if report.contains('\0') {
        return parse_nul_records(report);
    }
    report
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_name_status_line)
        .collect()
}

/// Parse `git diff --name-status -z` records: `status\0path\0`, or
/// `Rnnn\0old\0new\0` for renames and copies.
fn parse_nul_records(report: &str) -> Vec<ChangeEntry> {
    let mut entries = Vec::new();
    let mut fields = report.split('\0');

    while let Some(status) = fields.next() {
        let status = status.trim_start_matches(['\n', '\r']);
        let Some(code) = status.chars().next() else {
            continue;
        };
        let Some(mut path) = fields.next() else {
            break;
        };

        let status = ChangeStatus::from_code(code);
        if matches!(status, ChangeStatus::Renamed | ChangeStatus::Copied) {
            // Old path first, then the new one.
            match fields.next() {
                Some(new_path) if !new_path.is_empty() => path = new_path,
                _ => {}
            }
        }
        if path.is_empty() {
            continue;
        }

        entries.push(ChangeEntry {
            path: RelPath::new(path),
            status,
        });
    }

    entries
}

/// Whether a diff report lists no changes at all.
pub fn is_blank_report(report: &str) -> bool {
    report
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .is_empty()
}

/// Parse a name-status report into a [`ChangeSet`].
pub fn parse_change_set(report: &str) -> ChangeSet {
    parse_name_status(report)
        .into_iter()
        .map(|entry| (entry.path, entry.status))
        .collect()
}
