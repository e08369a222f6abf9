//! Where a repository's metadata lives.
//!
//! A checkout points at its metadata through a `.git` entry: a directory for a
//! plain clone, or a file holding `gitdir: <target>` for worktrees,
//! submodules, and `--separate-git-dir` clones. [`classify`] turns what was
//! found on disk into a [`RepositoryLocation`] in one step, so every layout
//! fills in all three directories itself.
//!
//! The three directories:
//!
//! - `metadata_dir`: where this checkout's `HEAD` and in-progress operation
//!   markers (`MERGE_MSG`, `rebase-merge/`, ...) live.
//! - `working_dir`: the shared store holding `config`, `logs/refs/stash`
//!   and `worktrees/`. Equal to `metadata_dir` except for linked worktrees.
//! - `real_dir`: the checkout directory git commands run in and the path
//!   shown to users, in the host's native form.
//!
//! `checkout_dir` is where the `.git` entry was found, which is what
//! `exclude-folders` patterns are matched against.

use std::path::Path;

use schemars::JsonSchema;
use serde::Serialize;

use super::error::LocateError;
use super::metadata::MetadataFs;
use super::GitRunner;
use crate::path::{self, PathSyntax, Wsl};

const WORKTREES_FRAGMENT: &str = ".git/worktrees/";
const MODULES_FRAGMENT: &str = ".git/modules/";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    JsonSchema,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Topology {
    Plain,
    Worktree,
    Submodule,
    SubmoduleWorktree,
    SeparateGitDir,
    Bare,
}

/// The resolved directories of one repository checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct RepositoryLocation {
    pub metadata_dir: String,
    pub working_dir: String,
    pub real_dir: String,
    /// Directory holding the `.git` entry, or the bare repository itself.
    pub checkout_dir: String,
    pub topology: Topology,
}

impl RepositoryLocation {
    pub fn is_worktree(&self) -> bool {
        matches!(
            self.topology,
            Topology::Worktree | Topology::SubmoduleWorktree
        )
    }

    /// Display name of the repository.
    ///
    /// For a linked worktree this is the main repository's directory (the one
    /// enclosing `.git/worktrees/<name>`), empty if the metadata path has
    /// another shape. Otherwise it is the checkout directory's name.
    pub fn repo_name(&self) -> String {
        if self.topology == Topology::Worktree {
            let Some(idx) = self.metadata_dir.rfind("/.git/worktrees") else {
                return String::new();
            };
            return path::base_name(&self.metadata_dir[..idx]).to_string();
        }
        path::base_name(&self.real_dir).to_string()
    }
}

/// A `.git` entry found while walking up from the start directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitMarker {
    /// `<dir>/.git` is a directory.
    Directory { path: String },
    /// `<dir>/.git` is a file; `content` is what it holds.
    File { path: String, content: String },
}

impl GitMarker {
    pub fn path(&self) -> &str {
        match self {
            GitMarker::Directory { path } | GitMarker::File { path, .. } => path,
        }
    }

    /// The directory containing the marker.
    pub fn checkout_dir(&self) -> &str {
        let path = self.path();
        path::parent(path).unwrap_or(path)
    }
}

/// Ambient inputs to classification.
pub struct Resolver<'a> {
    pub syntax: &'a dyn PathSyntax,
    pub wsl: Wsl,
    pub fs: &'a dyn MetadataFs,
}

impl Resolver<'_> {
    /// `real_dir` as handed to git and shown to users.
    fn display(&self, dir: &str) -> String {
        self.syntax.to_display(&self.wsl.to_windows(dir))
    }

    /// Checkout path recorded in a worktree's `gitdir` file, minus the
    /// trailing `.git` entry name.
    fn read_gitdir_marker(&self, dir: &str) -> Option<String> {
        let recorded = self.fs.read_trimmed(dir, "gitdir")?;
        let recorded = self.wsl.to_linux(&recorded);
        let checkout = recorded.strip_suffix(".git").unwrap_or(&recorded);
        let checkout = checkout.trim_end_matches(['/', '\\']);
        (!checkout.is_empty()).then(|| checkout.to_string())
    }
}

/// Classify a `.git` marker into a repository location.
///
/// Relative `gitdir:` targets are resolved against the directory holding the
/// marker using the resolver's path syntax. Only [`LocateError::UnrecognizedGitFile`]
/// is returned.
pub fn classify(
    marker: &GitMarker,
    resolver: &Resolver<'_>,
) -> Result<RepositoryLocation, LocateError> {
    let checkout = marker.checkout_dir();
    let content = match marker {
        GitMarker::Directory { path } => {
            return Ok(RepositoryLocation {
                metadata_dir: path.clone(),
                working_dir: path.clone(),
                real_dir: resolver.display(checkout),
                checkout_dir: resolver.display(checkout),
                topology: Topology::Plain,
            });
        }
        GitMarker::File { content, .. } => content,
    };

    let unrecognized = |target: &str| LocateError::UnrecognizedGitFile {
        marker: marker.path().to_string(),
        target: target.to_string(),
    };

    let Some(target) = content
        .lines()
        .next()
        .and_then(|line| line.trim().strip_prefix("gitdir:"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return Err(unrecognized(content.trim()));
    };
    let target = resolver.wsl.to_linux(target);
    let resolved = resolver.syntax.join(checkout, &target);

    if let Some(idx) = resolved.rfind(WORKTREES_FRAGMENT) {
        let real_dir = resolver
            .read_gitdir_marker(&resolved)
            .unwrap_or_else(|| checkout.to_string());
        return Ok(RepositoryLocation {
            working_dir: format!("{}.git", &resolved[..idx]),
            metadata_dir: resolved,
            real_dir: resolver.display(&real_dir),
            checkout_dir: resolver.display(checkout),
            topology: Topology::Worktree,
        });
    }

    if resolved.contains(MODULES_FRAGMENT) {
        if let Some(idx) = resolved.rfind("/worktrees/")
            && let Some(real_dir) = resolver.read_gitdir_marker(&resolved)
        {
            let module_dir = resolved[..idx].to_string();
            return Ok(RepositoryLocation {
                metadata_dir: module_dir.clone(),
                working_dir: module_dir,
                real_dir: resolver.display(&real_dir),
                checkout_dir: resolver.display(checkout),
                topology: Topology::SubmoduleWorktree,
            });
        }
        return Ok(RepositoryLocation {
            metadata_dir: resolved.clone(),
            working_dir: resolved.clone(),
            real_dir: resolver.display(&resolved),
            checkout_dir: resolver.display(checkout),
            topology: Topology::Submodule,
        });
    }

    // `--separate-git-dir`: the target holds both HEAD and the shared store;
    // git runs in the checkout that holds the `.git` file.
    if resolver.fs.has_file(&resolved, "HEAD") {
        return Ok(RepositoryLocation {
            metadata_dir: resolved.clone(),
            working_dir: resolved,
            real_dir: resolver.display(checkout),
            checkout_dir: resolver.display(checkout),
            topology: Topology::SeparateGitDir,
        });
    }

    Err(unrecognized(&target))
}

/// Walk from `start` towards the root looking for a `.git` entry.
pub fn find_marker(start: &Path) -> Option<GitMarker> {
    for dir in start.ancestors() {
        let candidate = dir.join(".git");
        let Ok(meta) = std::fs::metadata(&candidate) else {
            continue;
        };
        let path = path::to_slash(&candidate).into_owned();
        if meta.is_dir() {
            log::trace!("found .git directory at {path}");
            return Some(GitMarker::Directory { path });
        }
        match std::fs::read_to_string(&candidate) {
            Ok(content) => {
                log::trace!("found .git file at {path}");
                return Some(GitMarker::File { path, content });
            }
            Err(e) => log::debug!("unreadable .git file {path}: {e}"),
        }
    }
    None
}

/// Resolve the repository containing `start`.
///
/// When no `.git` entry exists above `start` and `bare_probe` is given, git
/// is asked whether `start` itself is a bare repository. A directory inside
/// a bare repository is not one: its git dir must be `start`.
pub fn locate(
    start: &Path,
    resolver: &Resolver<'_>,
    bare_probe: Option<&dyn GitRunner>,
) -> Result<RepositoryLocation, LocateError> {
    if let Some(marker) = find_marker(start) {
        let location = classify(&marker, resolver)?;
        log::debug!(
            "{} repository: metadata={} working={} real={}",
            location.topology,
            location.metadata_dir,
            location.working_dir,
            location.real_dir
        );
        return Ok(location);
    }

    let start_str = path::to_slash(start).into_owned();
    if let Some(git) = bare_probe
        && git.output(&["rev-parse", "--is-bare-repository"]).as_deref() == Some("true")
        && git
            .output(&["rev-parse", "--absolute-git-dir"])
            .is_some_and(|dir| resolver.syntax.clean(&dir) == resolver.syntax.clean(&start_str))
    {
        log::debug!("bare repository at {start_str}");
        return Ok(RepositoryLocation {
            metadata_dir: start_str.clone(),
            working_dir: start_str.clone(),
            real_dir: resolver.display(&start_str),
            checkout_dir: resolver.display(&start_str),
            topology: Topology::Bare,
        });
    }

    Err(LocateError::NotFound { start: start_str })
}
