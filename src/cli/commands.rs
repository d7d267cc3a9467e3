//! Subcommands driving the workflows from the command line.

use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};

use crate::cli::output::{write_nodes, write_revisions, TerminalSurface};
use crate::core::{
    is_blank_report, parse_change_set, DiffRequest, GitService, RelPath, Revision, Settings,
    ViewMode,
};
use crate::ui::{messages, ChangedListWorkflow, CompareOutcome, HistoryWorkflow};

/// Options shared by commands that open compares.
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Force the tree layout for changed lists.
    pub tree: bool,
    /// File to compare when several files changed.
    pub file: Option<RelPath>,
}

impl CompareOptions {
    fn view_mode(&self, settings: &Settings) -> ViewMode {
        if self.tree {
            ViewMode::Tree
        } else {
            settings.view_mode()
        }
    }
}

/// Pick a revision by list index or by hash prefix.
pub fn find_revision(revisions: &[Revision], selector: &str) -> Option<usize> {
    if let Ok(index) = selector.parse::<usize>() {
        if index < revisions.len() {
            return Some(index);
        }
    }
    if selector.is_empty() {
        return None;
    }
    revisions.iter().position(|r| r.id.starts_with(selector))
}

/// `log [PATH] [--json]`: list revisions touching a path.
pub async fn run_log<S: GitService, W: Write>(
    service: Rc<S>,
    path: Option<RelPath>,
    json: bool,
    out: W,
) -> Result<()> {
    let mut history = HistoryWorkflow::new(service);
    let mut surface = TerminalSurface::new(out, 0);
    if !history.show(path, &mut surface).await {
        surface.finish()?;
        return Ok(());
    }

    if json {
        let s = serde_json::to_string_pretty(history.revisions())
            .context("JSON serialization error")?;
        writeln!(surface.out(), "{s}")?;
    } else if history.revisions().is_empty() {
        writeln!(surface.out(), "No revisions found")?;
    } else {
        write_revisions(surface.out(), history.revisions(), None)?;
    }
    Ok(())
}

/// `compare [PATH] --rev <SEL>`: compare a revision with its predecessor.
pub async fn run_compare<S: GitService, W: Write>(
    service: Rc<S>,
    path: Option<RelPath>,
    selector: &str,
    options: &CompareOptions,
    settings: &Settings,
    out: W,
) -> Result<()> {
    let mut history = HistoryWorkflow::new(service);
    let mut surface = TerminalSurface::new(out, settings.context_lines);
    if !history.show(path, &mut surface).await {
        return surface.finish();
    }

    let Some(index) = find_revision(history.revisions(), selector) else {
        bail!("No revision matches {selector}");
    };
    history.select_revision(index);
    writeln!(surface.out(), "{}\n", history.description())?;

    history
        .changed_list_mut()
        .set_view_mode(options.view_mode(settings));
    let outcome = history.compare(&mut surface).await;
    tracing::info!(?outcome, "history compare finished");
    if outcome != CompareOutcome::ChangedList {
        return surface.finish();
    }

    let list = history.changed_list_mut();
    write_nodes(surface.out(), &list.rows())?;
    if let Some(file) = &options.file {
        if !list.select_path(file) {
            bail!("{file} is not among the changed files");
        }
        writeln!(surface.out())?;
        list.compare(&mut surface).await;
    }
    surface.finish()
}

/// `changes [--from A] [--to B]`: list changes between two bounds and compare one file.
///
/// `edit` replaces the right-hand side on close, as if the user had edited it.
pub async fn run_changes<S: GitService, W: Write>(
    service: Rc<S>,
    from: Option<String>,
    to: Option<String>,
    options: &CompareOptions,
    edit: Option<&Path>,
    settings: &Settings,
    out: W,
) -> Result<()> {
    let mut surface = TerminalSurface::new(out, settings.context_lines);
    let request = DiffRequest::name_status(Vec::new(), from.clone(), to.clone());
    let report = service.diff(&request).await?;
    let changes = parse_change_set(&report);
    if changes.is_empty() && !is_blank_report(&report) {
        bail!(messages::DIFF_FAILED);
    }

    let mut list = ChangedListWorkflow::new(service);
    list.set_view_mode(options.view_mode(settings));
    list.show(changes, from, to)?;
    if list.changes().is_empty() {
        writeln!(surface.out(), "No changes detected")?;
        return Ok(());
    }
    write_nodes(surface.out(), &list.rows())?;

    let Some(file) = &options.file else {
        return Ok(());
    };
    if !list.select_path(file) {
        bail!("{file} is not among the changed files");
    }
    writeln!(surface.out())?;
    if list.compare(&mut surface).await != CompareOutcome::Opened {
        return surface.finish();
    }

    let Some(edit) = edit else {
        return Ok(());
    };
    let edited = std::fs::read_to_string(edit)
        .with_context(|| format!("Failed to read {}", edit.display()))?;
    let Some(outcome) = surface.dialog_mut().close(edited) else {
        return Ok(());
    };
    if list.compare_closed(&outcome, &mut surface).await {
        writeln!(surface.out(), "Saved {}", outcome.request.path)?;
    } else if outcome.changed && outcome.request.read_only {
        writeln!(surface.out(), "Compare is read-only; edits discarded")?;
    }
    surface.finish()
}

/// `config [--tree BOOL] [--context N]`: show or update settings.
pub fn run_config<W: Write>(
    path: &Path,
    tree: Option<bool>,
    context: Option<usize>,
    mut out: W,
) -> Result<()> {
    let mut settings = Settings::load_from(path);
    let before = settings.clone();
    if let Some(tree) = tree {
        settings.tree_view = tree;
    }
    if let Some(context) = context {
        settings.context_lines = context;
    }
    if settings != before {
        settings
            .save_to(path)
            .with_context(|| format!("Failed to save settings to {}", path.display()))?;
        tracing::info!(path = %path.display(), "settings saved");
    }

    let s = serde_json::to_string_pretty(&settings).context("JSON serialization error")?;
    writeln!(out, "{s}")?;
    Ok(())
}
