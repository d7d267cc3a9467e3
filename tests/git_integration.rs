//! Integration tests with real git repositories.

use std::path::Path;
use std::process::Command;

use revcompare::core::{
    diff, has_commits, list_revisions, parse_change_set, read_working_file, show_file_content,
    write_working_file, ChangeStatus, DiffRequest, RelPath, RepoError, RepoRoot,
};
use tempfile::TempDir;

fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

/// Create an empty repo with a configured identity.
fn create_empty_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let path = dir.path();
    git(path, &["init", "-q"]);
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    dir
}

fn commit(path: &Path, message: &str) -> String {
    git(path, &["add", "-A"]);
    git(path, &["commit", "-q", "-m", message]);
    git(path, &["rev-parse", "HEAD"])
}

/// Create a temporary git repo with three commits.
///
/// Returns the repo and the commit ids, oldest first.
fn create_test_repo() -> (TempDir, Vec<String>) {
    let dir = create_empty_repo();
    let path = dir.path();

    std::fs::write(path.join("file.txt"), "initial content\n").unwrap();
    let first = commit(path, "initial");

    std::fs::write(path.join("file.txt"), "second content\n").unwrap();
    std::fs::create_dir_all(path.join("src")).unwrap();
    std::fs::write(path.join("src/lib.rs"), "pub fn f() {}\n").unwrap();
    let second = commit(path, "add lib");

    std::fs::remove_file(path.join("file.txt")).unwrap();
    let third = commit(path, "remove file");

    (dir, vec![first, second, third])
}

#[test]
fn test_repo_discovery() {
    let (dir, _) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();
    assert!(repo.path().exists());
}

#[test]
fn test_discovery_outside_repo() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        RepoRoot::discover(dir.path()),
        Err(RepoError::NotARepo)
    ));
}

#[test]
fn test_relativize() {
    let (dir, _) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    assert_eq!(repo.relativize(dir.path()).unwrap(), None);
    assert_eq!(
        repo.relativize(&dir.path().join("src/lib.rs")).unwrap(),
        Some(RelPath::new("src/lib.rs"))
    );
    assert!(repo.relativize(Path::new("/")).is_err());
}

#[test]
fn test_relativize_deleted_file() {
    let (dir, _) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    // file.txt was removed by the last commit.
    assert!(!dir.path().join("file.txt").exists());
    assert_eq!(
        repo.relativize(&dir.path().join("file.txt")).unwrap(),
        Some(RelPath::new("file.txt"))
    );
    assert_eq!(
        repo.relativize(&dir.path().join("gone/nested.txt")).unwrap(),
        Some(RelPath::new("gone/nested.txt"))
    );
}

#[cfg(unix)]
#[test]
fn test_relativize_deleted_file_through_symlink() {
    let (dir, _) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    let links = TempDir::new().unwrap();
    let link = links.path().join("checkout");
    std::os::unix::fs::symlink(dir.path(), &link).unwrap();

    assert_eq!(
        repo.relativize(&link.join("src/lib.rs")).unwrap(),
        Some(RelPath::new("src/lib.rs"))
    );
    assert_eq!(
        repo.relativize(&link.join("file.txt")).unwrap(),
        Some(RelPath::new("file.txt"))
    );
}

#[test]
fn test_list_revisions_newest_first() {
    let (dir, ids) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    let revisions = list_revisions(&repo, None).unwrap();
    let listed: Vec<&str> = revisions.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str(), ids[0].as_str()]);
    assert_eq!(revisions[0].message, "remove file");
    assert_eq!(revisions[0].author, "Test");
    assert_eq!(revisions[0].email, "test@test.com");
}

#[test]
fn test_list_revisions_for_path() {
    let (dir, ids) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    let revisions = list_revisions(&repo, Some(&RelPath::new("src/lib.rs"))).unwrap();
    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0].id, ids[1]);
}

#[test]
fn test_list_revisions_without_commits() {
    let dir = create_empty_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    assert!(!has_commits(&repo).unwrap());
    assert!(matches!(
        list_revisions(&repo, None),
        Err(RepoError::NoInitialCommit)
    ));
}

#[test]
fn test_name_status_diff() {
    let (dir, ids) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    let request = DiffRequest::name_status(Vec::new(), Some(ids[0].clone()), Some(ids[1].clone()));
    let changes = parse_change_set(&diff(&repo, &request).unwrap());
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[&RelPath::new("file.txt")], ChangeStatus::Modified);
    assert_eq!(changes[&RelPath::new("src/lib.rs")], ChangeStatus::Added);

    let request = DiffRequest::name_status(
        vec![RelPath::new("file.txt")],
        Some(ids[1].clone()),
        Some(ids[2].clone()),
    );
    let changes = parse_change_set(&diff(&repo, &request).unwrap());
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[&RelPath::new("file.txt")], ChangeStatus::Deleted);
}

#[test]
fn test_name_status_diff_keeps_non_ascii_paths() {
    let dir = create_empty_repo();
    let path = dir.path();
    std::fs::write(path.join("café.txt"), "one\n").unwrap();
    let first = commit(path, "add");
    std::fs::write(path.join("café.txt"), "two\n").unwrap();
    let second = commit(path, "edit");

    let repo = RepoRoot::discover(path).unwrap();
    let request = DiffRequest::name_status(Vec::new(), Some(first.clone()), Some(second.clone()));
    let changes = parse_change_set(&diff(&repo, &request).unwrap());
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[&RelPath::new("café.txt")], ChangeStatus::Modified);

    assert_eq!(
        show_file_content(&repo, &RelPath::new("café.txt"), &second).unwrap(),
        b"two\n"
    );
}

#[test]
fn test_diff_from_empty_tree_and_to_working_tree() {
    let (dir, ids) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    let request = DiffRequest::name_status(Vec::new(), None, Some(ids[0].clone()));
    let changes = parse_change_set(&diff(&repo, &request).unwrap());
    assert_eq!(changes[&RelPath::new("file.txt")], ChangeStatus::Added);

    std::fs::write(dir.path().join("src/lib.rs"), "pub fn g() {}\n").unwrap();
    let request = DiffRequest::name_status(Vec::new(), Some(ids[2].clone()), None);
    let changes = parse_change_set(&diff(&repo, &request).unwrap());
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[&RelPath::new("src/lib.rs")], ChangeStatus::Modified);
}

#[test]
fn test_diff_rejects_unknown_revision() {
    let (dir, ids) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    let request = DiffRequest::name_status(Vec::new(), Some("nope".into()), Some(ids[0].clone()));
    assert!(matches!(diff(&repo, &request), Err(RepoError::GitError(_))));
}

#[test]
fn test_show_file_content() {
    let (dir, ids) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();
    let file = RelPath::new("file.txt");

    assert_eq!(show_file_content(&repo, &file, &ids[0]).unwrap(), b"initial content\n");
    assert_eq!(show_file_content(&repo, &file, &ids[1]).unwrap(), b"second content\n");
}

#[test]
fn test_show_file_content_distinguishes_missing_path() {
    let (dir, ids) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();

    let deleted = show_file_content(&repo, &RelPath::new("file.txt"), &ids[2]);
    assert!(matches!(deleted, Err(RepoError::PathNotInRevision { .. })));

    let not_yet_added = show_file_content(&repo, &RelPath::new("src/lib.rs"), &ids[0]);
    assert!(matches!(not_yet_added, Err(RepoError::PathNotInRevision { .. })));

    let bad_revision = show_file_content(&repo, &RelPath::new("file.txt"), "deadbeef");
    assert!(matches!(bad_revision, Err(RepoError::InvalidRevision(_))));
}

#[test]
fn test_working_file_round_trip() {
    let (dir, _) = create_test_repo();
    let repo = RepoRoot::discover(dir.path()).unwrap();
    let lib = RelPath::new("src/lib.rs");

    assert_eq!(
        read_working_file(&repo, &lib).unwrap().as_deref(),
        Some(&b"pub fn f() {}\n"[..])
    );
    assert_eq!(read_working_file(&repo, &RelPath::new("file.txt")).unwrap(), None);
    assert_eq!(read_working_file(&repo, &RelPath::new("src")).unwrap(), None);

    write_working_file(&repo, &RelPath::new("new/dir/file.txt"), b"hi\n").unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("new/dir/file.txt")).unwrap(),
        "hi\n"
    );
}
