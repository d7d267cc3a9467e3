//! Side-by-side line diff between the two contents of a compare.

use similar::{ChangeTag, TextDiff};

use crate::core::TextBuffer;

/// Context lines kept around each hunk unless configured otherwise.
pub const DEFAULT_CONTEXT: usize = 3;

/// A line on one side of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    /// Line number, 0-indexed.
    pub line_num: usize,
    /// Line text without newline.
    pub content: String,
}

/// Kind of change for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Both sides are equal.
    Equal,
    /// Only the left side has a line.
    Delete,
    /// Only the right side has a line.
    Insert,
    /// Both sides have a line and they differ.
    Replace,
}

/// One row of the two-pane view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRow {
    /// Left-hand line, if any.
    pub old: Option<LineRef>,
    /// Right-hand line, if any.
    pub new: Option<LineRef>,
    /// Kind of change.
    pub kind: ChangeKind,
}

/// A run of rows containing changes plus surrounding context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunk {
    /// First row index.
    pub start_row: usize,
    /// Number of rows.
    pub row_count: usize,
}

/// Line counts of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    /// Lines only on the right.
    pub added: usize,
    /// Lines only on the left.
    pub removed: usize,
}

/// Rows and hunks for two contents.
#[derive(Debug, Clone, Default)]
pub struct ContentDiff {
    /// All rows, in order.
    pub rows: Vec<DiffRow>,
    /// Hunks, sorted by start row.
    pub hunks: Vec<Hunk>,
}

impl ContentDiff {
    /// Diff two buffers with the default context.
    pub fn compute(old: &TextBuffer, new: &TextBuffer) -> Self {
        Self::compute_with_context(old, new, DEFAULT_CONTEXT)
    }

    /// Diff two buffers keeping `context` unchanged rows around each hunk.
    pub fn compute_with_context(old: &TextBuffer, new: &TextBuffer, context: usize) -> Self {
        let old_lines = old.lines();
        let new_lines = new.lines();
        let old_refs: Vec<&str> = old_lines.iter().map(|l| l.as_ref()).collect();
        let new_refs: Vec<&str> = new_lines.iter().map(|l| l.as_ref()).collect();

        let diff = TextDiff::from_slices(&old_refs, &new_refs);
        let rows = pair_changes(&diff);
        let hunks = build_hunks(&rows, context);
        Self { rows, hunks }
    }

    /// Whether any row differs.
    pub fn has_changes(&self) -> bool {
        self.rows.iter().any(|r| r.kind != ChangeKind::Equal)
    }

    /// Rows belonging to a hunk.
    pub fn hunk_rows(&self, hunk: &Hunk) -> &[DiffRow] {
        let end = (hunk.start_row + hunk.row_count).min(self.rows.len());
        &self.rows[hunk.start_row.min(end)..end]
    }

    /// Added and removed line counts.
    pub fn stats(&self) -> DiffStats {
        self.rows.iter().fold(DiffStats::default(), |mut stats, row| {
            if row.old.is_some() && row.kind != ChangeKind::Equal {
                stats.removed += 1;
            }
            if row.new.is_some() && row.kind != ChangeKind::Equal {
                stats.added += 1;
            }
            stats
        })
    }
}

/// Walk the edit script, pairing each run of deletes with the inserts that follow it.
fn pair_changes<'a>(diff: &TextDiff<'a, 'a, 'a, str>) -> Vec<DiffRow> {
    let mut rows = Vec::new();
    let mut deletes: Vec<LineRef> = Vec::new();
    let mut inserts: Vec<LineRef> = Vec::new();

    for change in diff.iter_all_changes() {
        let content = change.value().to_string();
        match change.tag() {
            ChangeTag::Equal => {
                flush_run(&mut rows, &mut deletes, &mut inserts);
                let (Some(old_line), Some(new_line)) = (change.old_index(), change.new_index())
                else {
                    continue;
                };
                rows.push(DiffRow {
                    old: Some(LineRef {
                        line_num: old_line,
                        content: content.clone(),
                    }),
                    new: Some(LineRef {
                        line_num: new_line,
                        content,
                    }),
                    kind: ChangeKind::Equal,
                });
            }
            ChangeTag::Delete => {
                if let Some(line_num) = change.old_index() {
                    deletes.push(LineRef { line_num, content });
                }
            }
            ChangeTag::Insert => {
                if let Some(line_num) = change.new_index() {
                    inserts.push(LineRef { line_num, content });
                }
            }
        }
    }
    flush_run(&mut rows, &mut deletes, &mut inserts);
    rows
}

fn flush_run(rows: &mut Vec<DiffRow>, deletes: &mut Vec<LineRef>, inserts: &mut Vec<LineRef>) {
    let mut old_iter = deletes.drain(..);
    let mut new_iter = inserts.drain(..);
    loop {
        let (old, new) = (old_iter.next(), new_iter.next());
        let kind = match (&old, &new) {
            (Some(_), Some(_)) => ChangeKind::Replace,
            (Some(_), None) => ChangeKind::Delete,
            (None, Some(_)) => ChangeKind::Insert,
            (None, None) => break,
        };
        rows.push(DiffRow { old, new, kind });
    }
}

fn build_hunks(rows: &[DiffRow], context: usize) -> Vec<Hunk> {
    let mut hunks: Vec<Hunk> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        if row.kind == ChangeKind::Equal {
            continue;
        }
        let start = i.saturating_sub(context);
        let end = (i + context + 1).min(rows.len());
        match hunks.last_mut() {
            // Merge when the context windows touch or overlap.
            Some(last) if start <= last.start_row + last.row_count => {
                last.row_count = end - last.start_row;
            }
            _ => hunks.push(Hunk {
                start_row: start,
                row_count: end - start,
            }),
        }
    }

    hunks
}
