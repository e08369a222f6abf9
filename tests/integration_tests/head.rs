use gitline::config::GitOptions;
use gitline::git::{DetachedTarget, HeadContext, HeadRef};
use insta::assert_snapshot;
use rstest::rstest;

use crate::common::{TestRepo, evaluate, plain_options, repo};

/// `main` and `feature` both change `conflict.txt` after the initial commit.
fn diverged(repo: &TestRepo) {
    repo.run_git(&["checkout", "-q", "-b", "feature"]);
    repo.commit_file("conflict.txt", "feature side\n", "Feature change");
    repo.run_git(&["checkout", "-q", "main"]);
    repo.commit_file("conflict.txt", "main side\n", "Main change");
}

#[rstest]
fn test_clean_branch(repo: TestRepo) {
    let context = evaluate(repo.root_path(), &plain_options());
    assert_snapshot!(context.head_display, @"branch main");
    assert_eq!(
        context.head,
        HeadContext::Clean {
            branch: "main".into()
        }
    );
}

#[test]
fn test_unborn_branch() {
    let repo = TestRepo::empty();
    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!(context.head_display, "branch main");
    assert_eq!(context.hash, "");

    let options = GitOptions {
        fetch_status: false,
        ..plain_options()
    };
    let context = evaluate(repo.root_path(), &options);
    assert_eq!(context.head_display, "branch main");
}

#[rstest]
fn test_detached_at_commit(repo: TestRepo) {
    repo.commit("Second");
    repo.run_git(&["checkout", "-q", "--detach", "HEAD~1"]);
    let short = repo.short_sha("HEAD");

    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!(context.ref_name, "(detached)");
    assert_eq!(context.head_display, format!("branch detached at commit {short}"));
    assert_eq!(
        context.head,
        HeadContext::Detached {
            target: DetachedTarget::Commit(short.clone())
        }
    );

    let options = GitOptions {
        fetch_status: false,
        ..plain_options()
    };
    let context = evaluate(repo.root_path(), &options);
    assert_eq!(context.head_display, format!("commit {short}"));
}

#[rstest]
fn test_detached_at_tag(repo: TestRepo) {
    repo.run_git(&["tag", "v1.0"]);
    repo.run_git(&["checkout", "-q", "v1.0"]);
    let context = evaluate(repo.root_path(), &plain_options());
    assert_snapshot!(context.head_display, @"branch detached at tag v1.0");
}

#[rstest]
fn test_merge_conflict(repo: TestRepo) {
    diverged(&repo);
    repo.run_git_expecting_failure(&["merge", "feature"]);

    let context = evaluate(repo.root_path(), &plain_options());
    assert_snapshot!(context.head_display, @"merge branch feature into branch main");
    assert_eq!(context.staging.unmerged, 1);
}

#[rstest]
fn test_rebase_conflict(repo: TestRepo) {
    diverged(&repo);
    let onto = repo.short_sha("main");
    repo.run_git(&["checkout", "-q", "feature"]);
    repo.run_git_expecting_failure(&["rebase", "main"]);

    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!(
        context.head_display,
        format!("rebase branch feature onto branch main (1/1) at commit {onto}")
    );
    let HeadContext::RebaseMerge {
        origin, step, total, ..
    } = &context.head
    else {
        panic!("expected an interactive rebase, got {:?}", context.head);
    };
    assert_eq!(origin, &HeadRef::Branch("feature".into()));
    assert_eq!((*step, *total), (1, 1));
}

#[rstest]
fn test_cherry_pick_conflict(repo: TestRepo) {
    diverged(&repo);
    let picked = repo.short_sha("feature");
    repo.run_git_expecting_failure(&["cherry-pick", "feature"]);

    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!(
        context.head_display,
        format!("pick commit {picked} onto branch main")
    );
}

#[rstest]
fn test_revert_conflict(repo: TestRepo) {
    repo.commit_file("revert.txt", "one\n", "Add one");
    let reverted = repo.short_sha("HEAD");
    repo.commit_file("revert.txt", "two\n", "Change to two");
    repo.run_git_expecting_failure(&["revert", "--no-edit", "HEAD~1"]);

    let context = evaluate(repo.root_path(), &plain_options());
    assert_eq!(
        context.head_display,
        format!("revert commit {reverted} onto branch main")
    );
}

#[rstest]
fn test_long_branch_is_shortened(repo: TestRepo) {
    repo.run_git(&["checkout", "-q", "-b", "feature/very-long-branch-name"]);
    let options = GitOptions {
        branch_max_length: 8,
        truncate_symbol: "…".into(),
        full_branch_path: false,
        ..plain_options()
    };
    let context = evaluate(repo.root_path(), &options);
    assert_snapshot!(context.head_display, @"branch very-lon…");
    assert_eq!(context.ref_name, "feature/very-long-branch-name");
}
