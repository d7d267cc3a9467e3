//! In-memory service and recording surface for workflow tests.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use crate::core::{DiffRequest, GitService, RelPath, RepoError, Revision};
use crate::ui::{CompareRequest, Surface};

/// Failure a fake call should produce.
#[derive(Debug, Clone)]
pub(crate) enum Fail {
    NoInitialCommit,
    PathNotInRevision,
    Generic(&'static str),
}

impl Fail {
    fn into_error(self, path: &str, revision: &str) -> RepoError {
        match self {
            Fail::NoInitialCommit => RepoError::NoInitialCommit,
            Fail::PathNotInRevision => RepoError::PathNotInRevision {
                path: path.to_string(),
                revision: revision.to_string(),
            },
            Fail::Generic(message) => RepoError::GitError(message.to_string()),
        }
    }
}

/// A call the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Log(Option<String>),
    Diff(Option<String>, Option<String>, Vec<String>),
    Show(String, String),
    Working(String),
    Write(String, String),
}

#[derive(Debug, Default)]
pub(crate) struct FakeService {
    pub log: Option<Result<Vec<Revision>, Fail>>,
    pub diff: Option<Result<String, Fail>>,
    pub contents: HashMap<(String, String), Result<String, Fail>>,
    pub working: RefCell<HashMap<String, String>>,
    pub fail_writes: bool,
    pub calls: RefCell<Vec<Call>>,
}

impl FakeService {
    pub fn with_content(mut self, path: &str, revision: &str, content: &str) -> Self {
        self.contents.insert(
            (path.to_string(), revision.to_string()),
            Ok(content.to_string()),
        );
        self
    }

    pub fn with_failure(mut self, path: &str, revision: &str, fail: Fail) -> Self {
        self.contents
            .insert((path.to_string(), revision.to_string()), Err(fail));
        self
    }

    pub fn with_working(self, path: &str, content: &str) -> Self {
        self.working
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn show_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Show(..)))
            .count()
    }
}

impl GitService for FakeService {
    async fn log(&self, path: Option<&RelPath>) -> Result<Vec<Revision>, RepoError> {
        self.calls
            .borrow_mut()
            .push(Call::Log(path.map(|p| p.to_string())));
        match self.log.clone() {
            Some(Ok(revisions)) => Ok(revisions),
            Some(Err(fail)) => Err(fail.into_error("", "")),
            None => Ok(Vec::new()),
        }
    }

    async fn diff(&self, request: &DiffRequest) -> Result<String, RepoError> {
        self.calls.borrow_mut().push(Call::Diff(
            request.revision_a.clone(),
            request.revision_b.clone(),
            request.paths.iter().map(|p| p.to_string()).collect(),
        ));
        match self.diff.clone() {
            Some(Ok(report)) => Ok(report),
            Some(Err(fail)) => Err(fail.into_error("", "")),
            None => Ok(String::new()),
        }
    }

    async fn show_file_content(&self, path: &RelPath, revision: &str) -> Result<String, RepoError> {
        self.calls
            .borrow_mut()
            .push(Call::Show(path.to_string(), revision.to_string()));
        match self
            .contents
            .get(&(path.to_string(), revision.to_string()))
            .cloned()
        {
            Some(Ok(content)) => Ok(content),
            Some(Err(fail)) => Err(fail.into_error(path.as_str(), revision)),
            None => Err(Fail::PathNotInRevision.into_error(path.as_str(), revision)),
        }
    }

    async fn working_file(&self, path: &RelPath) -> Result<Option<String>, RepoError> {
        self.calls
            .borrow_mut()
            .push(Call::Working(path.to_string()));
        Ok(self.working.borrow().get(path.as_str()).cloned())
    }

    async fn write_working_file(&self, path: &RelPath, content: &str) -> Result<(), RepoError> {
        self.calls
            .borrow_mut()
            .push(Call::Write(path.to_string(), content.to_string()));
        if self.fail_writes {
            return Err(RepoError::GitError("disk full".to_string()));
        }
        self.working
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }
}

/// Something the workflow showed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shown {
    Message(String, String),
    Failure(String),
    Compare(CompareRequest),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub shown: Vec<Shown>,
}

impl RecordingSurface {
    pub fn compares(&self) -> Vec<&CompareRequest> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Compare(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Failure(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn show_message(&mut self, title: &str, text: &str) {
        self.shown
            .push(Shown::Message(title.to_string(), text.to_string()));
    }

    fn notify_failure(&mut self, message: &str) {
        self.shown.push(Shown::Failure(message.to_string()));
    }

    fn open_compare(&mut self, request: CompareRequest) {
        self.shown.push(Shown::Compare(request));
    }
}

/// Revisions `ids[0]` (newest) .. `ids[n-1]` (oldest).
pub(crate) fn revisions(ids: &[&str]) -> Vec<Revision> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| Revision {
            id: (*id).to_string(),
            author: "Test".to_string(),
            email: "test@example.com".to_string(),
            committed_at: Utc
                .timestamp_opt(1_700_000_000 - i as i64 * 60, 0)
                .single()
                .unwrap_or_default(),
            message: format!("commit {id}"),
        })
        .collect()
}
