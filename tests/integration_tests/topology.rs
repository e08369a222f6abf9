use gitline::config::GitOptions;
use gitline::git::{LocateError, Topology};
use gitline::segment::GitSegment;
use rstest::rstest;

use crate::common::{TestRepo, canonicalize, evaluate, plain_options, repo, slash};

fn locate_error(dir: &std::path::Path, options: &GitOptions) -> LocateError {
    let Err(err) = GitSegment::locate(dir, options) else {
        panic!("expected {} to have no repository", dir.display());
    };
    err.downcast_ref::<LocateError>()
        .cloned()
        .unwrap_or_else(|| panic!("not an absence error: {err:#}"))
}

#[rstest]
fn test_plain_repository(repo: TestRepo) {
    let context = evaluate(repo.root_path(), &plain_options());
    let location = &context.location;
    let git_dir = slash(&repo.root_path().join(".git"));

    assert_eq!(location.topology, Topology::Plain);
    assert_eq!(location.metadata_dir, git_dir);
    assert_eq!(location.working_dir, git_dir);
    assert_eq!(location.real_dir, slash(repo.root_path()));
    assert_eq!(context.repo_name, "repo");
    assert!(!context.is_work_tree);
    assert!(!context.is_bare);
}

#[rstest]
fn test_from_nested_directory(repo: TestRepo) {
    repo.write_file("src/deep/nested/file.rs", "");
    let nested = repo.root_path().join("src/deep/nested");
    let context = evaluate(&nested, &plain_options());
    assert_eq!(context.location.real_dir, slash(repo.root_path()));
}

#[rstest]
fn test_linked_worktree(repo: TestRepo) {
    let worktree = repo.add_worktree("feature");
    let context = evaluate(&worktree, &plain_options());
    let location = &context.location;

    assert_eq!(location.topology, Topology::Worktree);
    assert_eq!(
        location.metadata_dir,
        slash(&repo.root_path().join(".git/worktrees/repo.feature"))
    );
    assert_eq!(location.working_dir, slash(&repo.root_path().join(".git")));
    assert_eq!(location.real_dir, slash(&worktree));
    assert!(context.is_work_tree);
    assert_eq!(context.repo_name, "repo");
    assert_eq!(context.head_display, "branch feature");
}

#[rstest]
fn test_submodule(repo: TestRepo) {
    let submodule = repo.add_submodule("vendored");
    let context = evaluate(&submodule, &plain_options());
    let location = &context.location;
    let module_dir = slash(&repo.root_path().join(".git/modules/vendored"));

    assert_eq!(location.topology, Topology::Submodule);
    assert_eq!(location.metadata_dir, module_dir);
    assert_eq!(location.working_dir, module_dir);
    assert_eq!(location.real_dir, module_dir);
    assert_eq!(context.repo_name, "vendored");
}

#[rstest]
fn test_separate_git_dir(repo: TestRepo) {
    let checkout = repo.temp_path().join("separate");
    let metadata = repo.temp_path().join("separate-meta");
    repo.run_git(&[
        "init",
        "-q",
        &format!("--separate-git-dir={}", metadata.display()),
        &checkout.to_string_lossy(),
    ]);

    let context = evaluate(&checkout, &plain_options());
    let location = &context.location;
    assert_eq!(location.topology, Topology::SeparateGitDir);
    assert_eq!(location.metadata_dir, slash(&canonicalize(&metadata)));
    assert_eq!(location.working_dir, location.metadata_dir);
    assert_eq!(location.real_dir, slash(&canonicalize(&checkout)));
}

#[rstest]
fn test_bare_repository_requires_opt_in(repo: TestRepo) {
    let bare = repo.temp_path().join("bare.git");
    repo.run_git(&["init", "-q", "--bare", &bare.to_string_lossy()]);

    assert!(matches!(
        locate_error(&bare, &plain_options()),
        LocateError::NotFound { .. }
    ));

    let options = GitOptions {
        fetch_bare_info: true,
        ..plain_options()
    };
    let segment = GitSegment::locate(&bare, &options).unwrap();
    assert_eq!(segment.location().topology, Topology::Bare);
    assert_eq!(segment.location().real_dir, slash(&bare));
    assert!(segment.evaluate().is_bare);
}

#[test]
fn test_outside_repository_is_absence() {
    let dir = tempfile::tempdir().unwrap();
    let dir = canonicalize(dir.path());
    assert!(matches!(
        locate_error(&dir, &plain_options()),
        LocateError::NotFound { .. }
    ));
}

#[rstest]
fn test_excluded_folder(repo: TestRepo) {
    let options = GitOptions {
        exclude_folders: vec![format!("{}.*", regex::escape(&slash(&repo.temp_path())))],
        ..plain_options()
    };
    assert!(matches!(
        locate_error(repo.root_path(), &options),
        LocateError::Excluded { .. }
    ));
}

#[rstest]
fn test_submodule_excluded_by_checkout_path(repo: TestRepo) {
    let submodule = repo.add_submodule("vendored");
    let options = GitOptions {
        exclude_folders: vec![regex::escape(&slash(&submodule))],
        ..plain_options()
    };
    assert_eq!(
        locate_error(&submodule, &options),
        LocateError::Excluded {
            dir: slash(&submodule),
            pattern: regex::escape(&slash(&submodule)),
        }
    );
    // The parent checkout is not matched by the submodule's pattern.
    assert!(GitSegment::locate(repo.root_path(), &options).is_ok());
}

#[rstest]
fn test_missing_git_executable(repo: TestRepo) {
    let options = GitOptions {
        git_command: "gitline-no-such-git".into(),
        ..plain_options()
    };
    assert_eq!(
        locate_error(repo.root_path(), &options),
        LocateError::GitNotInstalled {
            command: "gitline-no-such-git".into()
        }
    );
}
