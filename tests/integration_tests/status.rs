use gitline::config::GitOptions;
use gitline::git::StatusCounts;
use insta::assert_snapshot;
use rstest::rstest;

use crate::common::{TestRepo, evaluate, plain_options, repo, repo_with_remote};

#[rstest]
fn test_clean_checkout(repo: TestRepo) {
    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!(context.working, StatusCounts::default());
    assert_eq!(context.staging, StatusCounts::default());
    assert_eq!(context.hash, repo.git_output(&["rev-parse", "HEAD"]));
    assert_eq!(context.short_hash, repo.short_sha("HEAD"));
    assert_eq!(context.upstream, "");
    assert_eq!(context.branch_status, "");
    assert_snapshot!(context.to_text(), @"branch main");
}

#[rstest]
fn test_working_and_staged_changes(repo: TestRepo) {
    repo.commit_file("tracked.txt", "v1\n", "Add tracked");
    repo.commit_file("doomed.txt", "bye\n", "Add doomed");

    repo.write_file("tracked.txt", "v2\n");
    std::fs::remove_file(repo.root_path().join("doomed.txt")).unwrap();
    repo.write_file("untracked-a.txt", "");
    repo.write_file("untracked-b.txt", "");
    repo.write_file("staged.txt", "new\n");
    repo.run_git(&["add", "staged.txt"]);
    repo.write_file("file.txt", "staged edit\n");
    repo.run_git(&["add", "file.txt"]);

    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!(context.working.modified, 1);
    assert_eq!(context.working.deleted, 1);
    assert_eq!(context.working.untracked, 2);
    assert_eq!(context.staging.added, 1);
    assert_eq!(context.staging.modified, 1);
    assert_snapshot!(context.to_text(), @"branch main | ~1 -1 ?2 | +1 ~1");
}

#[rstest]
fn test_untracked_mode_no(repo: TestRepo) {
    repo.write_file("untracked.txt", "");
    let mut options = plain_options();
    options
        .untracked_modes
        .insert(repo.root_path().to_string_lossy().into_owned(), "no".into());

    let context = evaluate(repo.root_path(), &options);
    assert_eq!(context.working.untracked, 0);
}

#[rstest]
fn test_in_sync_with_upstream(#[from(repo_with_remote)] repo: TestRepo) {
    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!(context.upstream, "origin/main");
    assert!(!context.upstream_gone);
    assert_eq!(context.branch_status, "equal");
}

#[rstest]
fn test_ahead_and_behind(#[from(repo_with_remote)] repo: TestRepo) {
    repo.commit("Pushed");
    repo.run_git(&["push", "-q"]);
    repo.run_git(&["reset", "-q", "--hard", "HEAD~1"]);

    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!((context.ahead, context.behind), (0, 1));
    assert_eq!(context.branch_status, "down1");

    repo.commit("Local only");
    repo.commit("Another local");
    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!((context.ahead, context.behind), (2, 1));
    assert_snapshot!(context.to_text(), @"branch main up2 down1");
}

#[rstest]
fn test_upstream_gone(#[from(repo_with_remote)] repo: TestRepo) {
    repo.run_git(&["checkout", "-q", "-b", "feature"]);
    repo.run_git(&["push", "-q", "-u", "origin", "feature"]);
    repo.run_git(&["push", "-q", "origin", "--delete", "feature"]);

    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!(context.upstream, "origin/feature");
    assert!(context.upstream_gone);
    assert_eq!(context.branch_status, "gone");
}

#[rstest]
fn test_push_status(#[from(repo_with_remote)] repo: TestRepo) {
    repo.commit("Local one");
    repo.commit("Local two");
    let options = GitOptions {
        fetch_push_status: true,
        ..plain_options()
    };

    let context = evaluate(repo.root_path(), &options);
    assert_eq!((context.push_ahead, context.push_behind), (2, 0));

    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!((context.push_ahead, context.push_behind), (0, 0));
}

#[rstest]
fn test_upstream_icon(#[from(repo_with_remote)] repo: TestRepo) {
    // Tracking refs survive the URL change; nothing is fetched.
    repo.run_git(&["remote", "set-url", "origin", "git@github.com:owner/repo.git"]);
    let options = GitOptions {
        fetch_upstream_icon: true,
        ..plain_options()
    };

    let context = evaluate(repo.root_path(), &options);
    assert_eq!(context.upstream_icon, "GH");
    assert_eq!(context.upstream_url, "https://github.com/owner/repo");

    let mut options = options;
    options
        .upstream_icons
        .insert("github.com/owner".into(), "OWN".into());
    let context = evaluate(repo.root_path(), &options);
    assert_eq!(context.upstream_icon, "OWN");
}

#[rstest]
fn test_stash_and_worktree_counts(repo: TestRepo) {
    for content in ["first stash", "second stash"] {
        repo.write_file("file.txt", content);
        repo.run_git(&["stash", "-q"]);
    }
    repo.add_worktree("one");
    repo.add_worktree("two");

    let options = GitOptions {
        fetch_stash_count: true,
        fetch_worktree_count: true,
        ..plain_options()
    };
    let context = evaluate(repo.root_path(), &options);
    assert_eq!(context.stash_count, 2);
    assert_eq!(context.worktree_count, 2);
    assert_snapshot!(context.to_text(), @"branch main | stash 2 | worktrees 2");

    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!((context.stash_count, context.worktree_count), (0, 0));
}

#[rstest]
fn test_commit_and_remotes(#[from(repo_with_remote)] repo: TestRepo) {
    repo.run_git(&["remote", "add", "mirror", "git@gitlab.com:group/mirror.git"]);
    repo.run_git(&["tag", "v0.1"]);
    let options = GitOptions {
        fetch_commit: true,
        fetch_remotes: true,
        ..plain_options()
    };

    let context = evaluate(repo.root_path(), &options);
    let commit = context.commit.expect("commit requested");
    assert_eq!(commit.author.name, "Test User");
    assert_eq!(commit.author.email, "test@example.com");
    assert_eq!(commit.subject, "Initial commit");
    assert_eq!(commit.timestamp, crate::common::TEST_EPOCH as i64);
    assert_eq!(commit.sha, repo.git_output(&["rev-parse", "HEAD"]));
    assert_eq!(commit.refs.heads, ["main"]);
    assert_eq!(commit.refs.tags, ["v0.1"]);
    assert_eq!(commit.refs.remotes, ["origin/main"]);

    assert_eq!(
        context.remotes.keys().collect::<Vec<_>>(),
        ["origin", "mirror"]
    );
    assert_eq!(context.remotes["mirror"], "https://gitlab.com/group/mirror");
}
