//! Plain-text rendering of revisions, changed files and compares.

use std::io::{self, Write};

use crate::core::{ChangeKind, ChangeNode, DiffRow, LineRef, NodeRow, Revision};
use crate::ui::{CompareDialog, CompareRequest, Surface};

/// Width of each column in the side-by-side view.
const COLUMN_WIDTH: usize = 60;

/// [`Surface`] that prints to a writer.
///
/// Opened compares are kept in a [`CompareDialog`] so the caller can close
/// them with edited content.
pub struct TerminalSurface<W> {
    out: W,
    dialog: CompareDialog,
    failures: Vec<String>,
}

impl<W: Write> TerminalSurface<W> {
    /// Print to `out`, keeping `context` lines around each hunk.
    pub fn new(out: W, context: usize) -> Self {
        Self {
            out,
            dialog: CompareDialog::new(context),
            failures: Vec::new(),
        }
    }

    /// Failures reported so far.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Fail with the reported failures, if any.
    pub fn finish(&self) -> anyhow::Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(self.failures.join("\n")))
        }
    }

    /// The dialog holding the last opened compare.
    pub fn dialog_mut(&mut self) -> &mut CompareDialog {
        &mut self.dialog
    }

    /// The underlying writer.
    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Consume the surface, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn show_message(&mut self, title: &str, text: &str) {
        let _ = writeln!(self.out, "{title}: {text}");
    }

    fn notify_failure(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }

    fn open_compare(&mut self, request: CompareRequest) {
        self.dialog.show(request);
        if let Err(e) = write_compare(&mut self.out, &self.dialog) {
            tracing::warn!(error = %e, "failed to print compare");
        }
    }
}

/// Print the revision list, marking the selected entry.
pub fn write_revisions(
    out: &mut impl Write,
    revisions: &[Revision],
    selected: Option<usize>,
) -> io::Result<()> {
    for (idx, revision) in revisions.iter().enumerate() {
        let marker = if selected == Some(idx) { '>' } else { ' ' };
        writeln!(
            out,
            "{marker}{idx:>4}  {}  {}  {:<20.20}  {}",
            revision.short_id(),
            revision.committed_at.format("%Y-%m-%d"),
            revision.author,
            revision.message
        )?;
    }
    Ok(())
}

/// Print visible change nodes, indented by depth.
pub fn write_nodes(out: &mut impl Write, rows: &[NodeRow<'_>]) -> io::Result<()> {
    for row in rows {
        let indent = "  ".repeat(row.depth);
        match row.node {
            ChangeNode::File { name, status, .. } => {
                writeln!(out, "{indent}{} {name}", status.label())?;
            }
            ChangeNode::Folder { name, expanded, .. } => {
                let marker = if *expanded { 'v' } else { '>' };
                writeln!(out, "{indent}{marker} {name}/")?;
            }
        }
    }
    Ok(())
}

/// Print the compare shown in `dialog` as two columns, hunk by hunk.
pub fn write_compare(out: &mut impl Write, dialog: &CompareDialog) -> io::Result<()> {
    let (Some(request), Some((left, right))) = (dialog.request(), dialog.column_titles()) else {
        return Ok(());
    };

    writeln!(out, "{}", request.path)?;
    writeln!(out, "--- {left}")?;
    if request.read_only {
        writeln!(out, "+++ {right}")?;
    } else {
        writeln!(out, "+++ {right} (editable)")?;
    }

    if dialog.is_binary() {
        let verdict = if dialog.has_changes() { "differ" } else { "are identical" };
        return writeln!(out, "Binary contents {verdict}");
    }
    let Some(diff) = dialog.diff() else {
        return Ok(());
    };
    if !diff.has_changes() {
        return writeln!(out, "No differences");
    }

    for hunk in &diff.hunks {
        let rows = diff.hunk_rows(hunk);
        writeln!(
            out,
            "@@ -{} +{} @@",
            first_line(rows, |r| r.old.as_ref()),
            first_line(rows, |r| r.new.as_ref())
        )?;
        for row in rows {
            write_row(out, row)?;
        }
    }
    let stats = diff.stats();
    writeln!(out, "{} added, {} removed", stats.added, stats.removed)
}

fn first_line(
    rows: &[DiffRow],
    side: impl Fn(&DiffRow) -> Option<&LineRef>,
) -> usize {
    rows.iter()
        .find_map(|r| side(r))
        .map_or(0, |line| line.line_num + 1)
}

fn write_row(out: &mut impl Write, row: &DiffRow) -> io::Result<()> {
    let marker = match row.kind {
        ChangeKind::Equal => ' ',
        ChangeKind::Delete => '-',
        ChangeKind::Insert => '+',
        ChangeKind::Replace => '~',
    };
    let (old_num, old_text) = cell(row.old.as_ref());
    let (new_num, new_text) = cell(row.new.as_ref());
    let line = format!(
        "{marker} {old_num:>5} {old_text:<width$.width$} | {new_num:>5} {new_text}",
        width = COLUMN_WIDTH
    );
    writeln!(out, "{}", line.trim_end())
}

fn cell(line: Option<&LineRef>) -> (String, String) {
    match line {
        Some(line) => ((line.line_num + 1).to_string(), line.content.replace('\t', "    ")),
        None => (String::new(), String::new()),
    }
}
