//! revcompare - compare git revisions of a file or a whole repository.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use revcompare::cli::{run_changes, run_compare, run_config, run_log, CompareOptions};
use revcompare::core::{GitCli, RelPath, RepoError, RepoRoot, Settings};
use revcompare::{logging, metrics};

/// Browse the revision history of a path and compare revisions.
#[derive(Parser, Debug)]
#[command(name = "revcompare", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the revisions touching a path (the whole repository by default)
    Log {
        /// File or directory to list revisions for
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print revisions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare a revision with its predecessor
    Compare {
        /// File or directory whose history is compared
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Revision to compare: list index (0 = newest) or hash prefix
        #[arg(short = 'r', long = "rev", value_name = "INDEX|HASH")]
        rev: String,

        /// Changed file to compare when several files changed
        #[arg(short = 'f', long = "file", value_name = "PATH")]
        file: Option<String>,

        /// Group changed files by directory
        #[arg(long)]
        tree: bool,
    },

    /// List files changed between two revisions and compare one of them
    Changes {
        /// Older revision (default: the empty initial state)
        #[arg(long, value_name = "REV")]
        from: Option<String>,

        /// Newer revision (default: the working tree)
        #[arg(long, value_name = "REV")]
        to: Option<String>,

        /// Group changed files by directory
        #[arg(long)]
        tree: bool,

        /// Changed file to compare
        #[arg(short = 'f', long = "file", value_name = "PATH")]
        file: Option<String>,

        /// Save FILE's contents as the edited working-tree side
        #[arg(long, value_name = "FILE", requires = "file")]
        edit: Option<PathBuf>,
    },

    /// Show or change persistent settings
    Config {
        /// Open changed-file lists grouped by directory
        #[arg(long, value_name = "BOOL")]
        tree: Option<bool>,

        /// Unchanged lines shown around each change
        #[arg(long, value_name = "N")]
        context: Option<usize>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init();
    metrics::init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(command: Command) -> Result<()> {
    if let Command::Config { tree, context } = command {
        return run_config(&Settings::default_path(), tree, context, io::stdout());
    }

    let repo = discover_repo()?;
    let settings = Settings::load();
    let service = Rc::new(GitCli::new(repo.clone()));

    match command {
        Command::Log { path, json } => {
            let path = relative_path(&repo, path.as_deref())?;
            run_log(service, path, json, io::stdout()).await
        }
        Command::Compare {
            path,
            rev,
            file,
            tree,
        } => {
            let path = relative_path(&repo, path.as_deref())?;
            let options = CompareOptions {
                tree,
                file: file.map(parse_rel_path).transpose()?,
            };
            run_compare(service, path, &rev, &options, &settings, io::stdout()).await
        }
        Command::Changes {
            from,
            to,
            tree,
            file,
            edit,
        } => {
            let options = CompareOptions {
                tree,
                file: file.map(parse_rel_path).transpose()?,
            };
            run_changes(
                service,
                from,
                to,
                &options,
                edit.as_deref(),
                &settings,
                io::stdout(),
            )
            .await
        }
        Command::Config { .. } => Ok(()),
    }
}

fn discover_repo() -> Result<RepoRoot> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    match RepoRoot::discover(&cwd) {
        Ok(repo) => Ok(repo),
        Err(RepoError::NotARepo) => anyhow::bail!("Not inside a git repository"),
        Err(e) => Err(e.into()),
    }
}

fn relative_path(repo: &RepoRoot, path: Option<&Path>) -> Result<Option<RelPath>> {
    match path {
        Some(path) => repo
            .relativize(path)
            .with_context(|| format!("Invalid path: {}", path.display())),
        None => Ok(None),
    }
}

fn parse_rel_path(path: String) -> Result<RelPath> {
    RelPath::try_new(path.trim_start_matches("./")).context("Invalid path: must be relative")
}
