//! revcompare - revision history and compare workflows for git repositories.
//!
//! Lists the revisions of a path, diffs a selected revision against its
//! predecessor, and opens either a single-file compare or a changed-file
//! list from which one file can be compared.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use revcompare::prelude::*;
//!
//! let repo = RepoRoot::discover(std::path::Path::new("."))?;
//! let mut history = HistoryWorkflow::new(Rc::new(GitCli::new(repo)));
//! history.show(None, &mut surface).await;
//! history.select_revision(0);
//! history.compare(&mut surface).await;
//! ```

#![deny(missing_docs)]

pub mod cli;
pub mod core;
pub mod logging;
pub mod metrics;
pub mod prelude;
pub mod ui;
