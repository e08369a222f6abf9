// Helpers are shared across test modules; not every module uses every one.
#![allow(dead_code)]

//! # Test utilities for gitline
//!
//! `TestRepo` creates an isolated git repository in a temporary directory,
//! with deterministic timestamps and its own global git config. Each test
//! gets a fresh repo that is cleaned up when the test ends.
//!
//! ## Environment isolation
//!
//! Git commands the tests run to *build* fixtures go through
//! `configure_git_cmd`, which points `GIT_CONFIG_GLOBAL` at a per-test file
//! and disables the system config. The code under test only reads
//! repository state, so it runs with the ambient environment.
//!
//! ## Path canonicalization
//!
//! Paths are canonicalized (macOS has `/var -> /private/var`) so that
//! expected directories compare equal to what the resolver reports.

use std::path::{Path, PathBuf};
use std::process::Command;

use gitline::config::{GitOptions, Icons};
use gitline::segment::{GitContext, GitSegment};
use tempfile::TempDir;

/// The epoch used for deterministic timestamps in tests (2025-01-02T00:00:00Z).
pub const TEST_EPOCH: u64 = 1735776000;

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

pub fn canonicalize(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap()
}

/// Forward-slash form, as the resolver reports metadata directories.
pub fn slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Isolate a git command from the host's configuration.
pub fn configure_git_cmd(cmd: &mut Command, git_config_path: &Path) {
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("GIT_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env("GIT_CONFIG_GLOBAL", git_config_path);
    cmd.env("GIT_CONFIG_SYSTEM", NULL_DEVICE);
    cmd.env("GIT_AUTHOR_DATE", "2025-01-02T00:00:00Z");
    cmd.env("GIT_COMMITTER_DATE", "2025-01-02T00:00:00Z");
    cmd.env("GIT_EDITOR", "true");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.env("LC_ALL", "C");
    cmd.env("LANG", "C");
}

pub fn check_git_status(output: &std::process::Output, cmd_desc: &str) {
    if !output.status.success() {
        panic!(
            "git {} failed:\nstdout: {}\nstderr: {}",
            cmd_desc,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Icons that read well in assertions.
pub fn plain_icons() -> Icons {
    Icons {
        branch: "branch ".into(),
        commit: "commit ".into(),
        tag: "tag ".into(),
        rebase: "rebase ".into(),
        cherry_pick: "pick ".into(),
        revert: "revert ".into(),
        merge: "merge ".into(),
        no_commits: "no-commits".into(),
        ahead: "up".into(),
        behind: "down".into(),
        gone: "gone".into(),
        identical: "equal".into(),
        github: "GH".into(),
        gitlab: "GL".into(),
        bitbucket: "BB".into(),
        azure_devops: "AZ".into(),
        codecommit: "AC".into(),
        codeberg: "CB".into(),
        git: "G".into(),
    }
}

/// Default options with [`plain_icons`].
pub fn plain_options() -> GitOptions {
    GitOptions {
        icons: plain_icons(),
        ..Default::default()
    }
}

/// Locate and evaluate, panicking when nothing is found.
pub fn evaluate(dir: &Path, options: &GitOptions) -> GitContext {
    GitSegment::locate(dir, options)
        .unwrap_or_else(|e| panic!("no repository at {}: {e:#}", dir.display()))
        .evaluate()
}

pub struct TestRepo {
    temp_dir: TempDir, // Must keep to ensure cleanup on drop
    root: PathBuf,
    git_config_path: PathBuf,
    config_path: PathBuf,
}

impl TestRepo {
    /// A repository on `main` with one commit.
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.commit("Initial commit");
        repo
    }

    /// A repository with no commits.
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");
        std::fs::create_dir(&root).unwrap();
        let root = canonicalize(&root);

        let git_config_path = temp_dir.path().join("test-gitconfig");
        std::fs::write(
            &git_config_path,
            "[user]\n\tname = Test User\n\temail = test@example.com\n\
             [advice]\n\tmergeConflict = false\n\tresolveConflict = false\n\
             [init]\n\tdefaultBranch = main\n\
             [protocol \"file\"]\n\tallow = always\n",
        )
        .unwrap();
        let config_path = temp_dir.path().join("gitline.toml");

        let repo = Self {
            temp_dir,
            root,
            git_config_path,
            config_path,
        };
        repo.run_git(&["init", "-q"]);
        repo
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Directory holding the repository and any siblings tests create.
    pub fn temp_path(&self) -> PathBuf {
        canonicalize(self.temp_dir.path())
    }

    pub fn git_command(&self) -> Command {
        let mut cmd = Command::new("git");
        configure_git_cmd(&mut cmd, &self.git_config_path);
        cmd.current_dir(&self.root);
        cmd
    }

    /// Run a git command in the repo root, panicking on failure.
    pub fn run_git(&self, args: &[&str]) {
        let output = self.git_command().args(args).output().unwrap();
        check_git_status(&output, &args.join(" "));
    }

    pub fn run_git_in(&self, dir: &Path, args: &[&str]) {
        let output = self
            .git_command()
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        check_git_status(&output, &args.join(" "));
    }

    /// Run a git command that is expected to stop on a conflict.
    pub fn run_git_expecting_failure(&self, args: &[&str]) {
        let output = self.git_command().args(args).output().unwrap();
        assert!(
            !output.status.success(),
            "git {} unexpectedly succeeded",
            args.join(" ")
        );
    }

    /// Run a git command and return trimmed stdout.
    pub fn git_output(&self, args: &[&str]) -> String {
        let output = self.git_command().args(args).output().unwrap();
        check_git_status(&output, &args.join(" "));
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn short_sha(&self, rev: &str) -> String {
        self.git_output(&["rev-parse", "--short=7", rev])
    }

    pub fn write_file(&self, name: &str, content: &str) {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Commit `message` into `file.txt`.
    pub fn commit(&self, message: &str) {
        self.commit_file("file.txt", message, message);
    }

    pub fn commit_file(&self, name: &str, content: &str, message: &str) {
        self.write_file(name, content);
        self.run_git(&["add", name]);
        self.run_git(&["commit", "-q", "-m", message]);
    }

    /// Add a linked worktree for a new branch, next to the main checkout.
    pub fn add_worktree(&self, branch: &str) -> PathBuf {
        let path = self.temp_path().join(format!("repo.{branch}"));
        let path_str = path.to_string_lossy().into_owned();
        self.run_git(&["worktree", "add", "-q", "-b", branch, &path_str]);
        canonicalize(&path)
    }

    /// Create a bare `origin` next to the repo and push `main` to it with
    /// tracking.
    pub fn setup_remote(&self) -> PathBuf {
        let remote = self.temp_path().join("origin.git");
        let remote_str = remote.to_string_lossy().into_owned();
        self.run_git(&["init", "-q", "--bare", &remote_str]);
        self.run_git(&["remote", "add", "origin", &remote_str]);
        self.run_git(&["push", "-q", "-u", "origin", "main"]);
        remote
    }

    /// Create another repository and add it as submodule `name`.
    pub fn add_submodule(&self, name: &str) -> PathBuf {
        let origin = self.temp_path().join(format!("{name}-origin"));
        let origin_str = origin.to_string_lossy().into_owned();
        self.run_git(&["init", "-q", &origin_str]);
        self.run_git_in(&origin, &["commit", "-q", "--allow-empty", "-m", "Submodule root"]);
        self.run_git(&["submodule", "-q", "add", &origin_str, name]);
        self.root.join(name)
    }

    /// Write the gitline config file used by [`Self::gitline`].
    pub fn write_config(&self, toml: &str) {
        std::fs::write(&self.config_path, toml).unwrap();
    }

    /// The `gitline` binary, pointed at this repo's config file.
    pub fn gitline(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gitline"));
        configure_git_cmd(&mut cmd, &self.git_config_path);
        cmd.env("GITLINE_CONFIG_PATH", &self.config_path);
        cmd.env_remove("RUST_LOG");
        cmd.current_dir(&self.root);
        cmd
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// Basic TestRepo fixture: a fresh repository with one commit.
///
/// ```ignore
/// #[rstest]
/// fn test_something(repo: TestRepo) {
///     repo.commit("second");
/// }
/// ```
#[rstest::fixture]
pub fn repo() -> TestRepo {
    TestRepo::new()
}

/// Repo with `main` pushed to a local bare `origin`.
#[rstest::fixture]
pub fn repo_with_remote(repo: TestRepo) -> TestRepo {
    repo.setup_remote();
    repo
}
