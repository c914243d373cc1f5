mod common;

use common::FixtureRepo;
use git2::Repository;
use hookci::errors::SourceControlError;
use hookci::utils::git::clone_branch;

#[test]
fn test_clone_branch_when_pushed_branch_is_not_default_expect_branch_tip_checked_out() {
    let remote = FixtureRepo::init();
    let default_branch = remote.current_branch();
    remote.create_branch("feature");
    let feature_tip = remote.commit_file("feature.txt", "feature work\n", "Add feature");
    remote.switch_to(&default_branch);
    let default_tip = remote.commit_file("default.txt", "default work\n", "Default work");

    let workspace = tempfile::tempdir().unwrap();
    clone_branch(&remote.url(), "feature", workspace.path()).unwrap();

    let cloned = Repository::open(workspace.path()).unwrap();
    let head = cloned.head().unwrap();
    assert_eq!(head.shorthand(), Some("feature"));
    assert_eq!(head.target(), Some(feature_tip));
    assert_ne!(head.target(), Some(default_tip));
    assert!(workspace.path().join("feature.txt").exists());
    assert!(!workspace.path().join("default.txt").exists());
}

#[test]
fn test_clone_branch_when_pushed_branch_is_default_expect_tip_checked_out() {
    let remote = FixtureRepo::init();
    let default_branch = remote.current_branch();
    let tip = remote.commit_file("build.gradle", "// build\n", "Add build file");

    let workspace = tempfile::tempdir().unwrap();
    clone_branch(&remote.url(), &default_branch, workspace.path()).unwrap();

    let cloned = Repository::open(workspace.path()).unwrap();
    assert_eq!(cloned.head().unwrap().target(), Some(tip));
    assert!(workspace.path().join("build.gradle").exists());
}

#[test]
fn test_clone_branch_when_branch_missing_expect_branch_not_found() {
    let remote = FixtureRepo::init();
    let workspace = tempfile::tempdir().unwrap();

    let actual = clone_branch(&remote.url(), "does-not-exist", workspace.path()).unwrap_err();
    assert!(
        matches!(actual, SourceControlError::BranchNotFound { ref branch } if branch == "does-not-exist"),
        "unexpected error: {actual}"
    );
}

#[test]
fn test_clone_branch_when_remote_missing_expect_clone_error() {
    let missing = tempfile::tempdir().unwrap();
    let remote_url = missing.path().join("nothing-here").to_string_lossy().into_owned();
    let workspace = tempfile::tempdir().unwrap();

    let actual = clone_branch(&remote_url, "main", workspace.path()).unwrap_err();
    assert!(
        matches!(actual, SourceControlError::Clone { .. }),
        "unexpected error: {actual}"
    );
}
