//! One evaluation of the git segment.
//!
//! [`GitSegment::locate`] answers "is there anything to show here?" and
//! [`GitSegment::evaluate`] collects the facts into a [`GitContext`]. Each
//! `GitSegment` is meant for a single prompt render: the config file and
//! commit details are read at most once and never refreshed.

use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use schemars::JsonSchema;
use serde::Serialize;

use crate::config::{GitOptions, Icons};
use crate::git::head::{self, ProbeInput};
use crate::git::{
    BranchFacts, Commit, DiskFs, GitRunner, HeadContext, HeadRef, HeadStyle, LocateError,
    MetadataFs, RepoConfig, RepositoryLocation, Resolver, StatusCounts, StatusReport, SystemGit,
    Topology, classify_upstream, normalize_remote_url, topology,
};
use crate::path::{self, Wsl};
use crate::shell_exec::command_exists;

/// Everything the segment knows about the repository, as handed to prompt
/// templates.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct GitContext {
    /// Rendered HEAD: branch, detached target, or operation in progress.
    #[serde(rename = "HEAD")]
    pub head_display: String,
    #[serde(rename = "Ref")]
    pub ref_name: String,
    pub hash: String,
    pub short_hash: String,
    pub working: StatusCounts,
    pub staging: StatusCounts,
    pub ahead: u32,
    pub behind: u32,
    /// Commits not yet on the push remote's copy of the branch.
    pub push_ahead: u32,
    pub push_behind: u32,
    pub branch_status: String,
    pub upstream: String,
    pub upstream_gone: bool,
    pub upstream_icon: String,
    #[serde(rename = "UpstreamURL")]
    pub upstream_url: String,
    pub stash_count: usize,
    pub worktree_count: usize,
    pub is_work_tree: bool,
    pub is_bare: bool,
    pub repo_name: String,
    pub location: RepositoryLocation,
    pub head: HeadContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<Commit>,
    /// Remote name → normalized URL (raw when it could not be normalized).
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub remotes: IndexMap<String, String>,
}

impl GitContext {
    /// One-line summary: HEAD and branch status, then non-empty working,
    /// staging and stash parts, separated by ` | `.
    pub fn to_text(&self) -> String {
        let mut head = self.head_display.clone();
        if !self.branch_status.is_empty() {
            head.push(' ');
            head.push_str(&self.branch_status);
        }
        let mut parts = vec![head];
        if self.working.changed() {
            parts.push(self.working.summary());
        }
        if self.staging.changed() {
            parts.push(self.staging.summary());
        }
        if self.stash_count > 0 {
            parts.push(format!("stash {}", self.stash_count));
        }
        if self.worktree_count > 0 {
            parts.push(format!("worktrees {}", self.worktree_count));
        }
        parts.join(" | ")
    }
}

/// Ahead/behind against the upstream: `↑2 ↓1`, `≢` when the upstream is gone,
/// `≡` when in sync, empty without an upstream.
pub fn branch_status(branch: &BranchFacts, icons: &Icons) -> String {
    match (branch.ahead, branch.behind) {
        (0, 0) if branch.upstream_gone => icons.gone.clone(),
        (0, 0) if branch.has_upstream() => icons.identical.clone(),
        (0, 0) => String::new(),
        (ahead, 0) => format!("{}{ahead}", icons.ahead),
        (0, behind) => format!("{}{behind}", icons.behind),
        (ahead, behind) => format!("{}{ahead} {}{behind}", icons.ahead, icons.behind),
    }
}

pub struct GitSegment<'a> {
    options: &'a GitOptions,
    location: RepositoryLocation,
    fs: Box<dyn MetadataFs + 'a>,
    git: Box<dyn GitRunner + 'a>,
    config: OnceCell<Option<RepoConfig>>,
    commit: OnceCell<Commit>,
}

impl<'a> GitSegment<'a> {
    /// Find the repository containing `start`.
    ///
    /// Absence (no git, no repository, excluded folder) is a [`LocateError`]
    /// inside the returned error; anything else is a real failure.
    pub fn locate(start: &Path, options: &'a GitOptions) -> anyhow::Result<Self> {
        let start = dunce::canonicalize(start)
            .with_context(|| format!("Failed to resolve {}", start.display()))?;

        let wsl = Wsl::detect(&start);
        let program = wsl.git_command(&options.git_command);
        if !command_exists(&program) {
            return Err(LocateError::GitNotInstalled { command: program }.into());
        }

        let resolver = Resolver {
            syntax: path::native(),
            wsl,
            fs: &DiskFs,
        };
        let bare_probe = options
            .fetch_bare_info
            .then(|| SystemGit::new(program.clone(), path::to_slash(&start).into_owned()));
        let location = topology::locate(
            &start,
            &resolver,
            bare_probe.as_ref().map(|git| git as &dyn GitRunner),
        )?;

        if let Some(pattern) = options.excluded_by(&location.checkout_dir) {
            log::debug!("{} excluded by {pattern}", location.checkout_dir);
            return Err(LocateError::Excluded {
                dir: location.checkout_dir,
                pattern: pattern.to_string(),
            }
            .into());
        }

        let git = SystemGit::new(program, location.real_dir.clone());
        Ok(Self::new(location, options, Box::new(DiskFs), Box::new(git)))
    }

    /// A segment over an already located repository.
    pub fn new(
        location: RepositoryLocation,
        options: &'a GitOptions,
        fs: Box<dyn MetadataFs + 'a>,
        git: Box<dyn GitRunner + 'a>,
    ) -> Self {
        Self {
            options,
            location,
            fs,
            git,
            config: OnceCell::new(),
            commit: OnceCell::new(),
        }
    }

    pub fn location(&self) -> &RepositoryLocation {
        &self.location
    }

    /// The shared `config` file; `None` when missing or malformed.
    pub fn config(&self) -> Option<&RepoConfig> {
        self.config
            .get_or_init(|| {
                let contents = self.fs.read(&format!("{}/config", self.location.working_dir))?;
                let parsed = RepoConfig::parse(&contents);
                if parsed.is_none() {
                    log::debug!("malformed config in {}", self.location.working_dir);
                }
                parsed
            })
            .as_ref()
    }

    /// HEAD commit details, loaded on first use.
    pub fn commit(&self) -> &Commit {
        self.commit.get_or_init(|| Commit::load(self.git.as_ref()))
    }

    /// URL of `remote`: the config file first, then `git remote get-url`.
    pub fn remote_url(&self, remote: &str) -> Option<String> {
        if let Some(url) = self.config().and_then(|c| c.remote_url(remote)) {
            return Some(url);
        }
        self.git.output(&["remote", "get-url", remote])
    }

    /// Every configured remote with its normalized URL.
    pub fn remotes(&self) -> IndexMap<String, String> {
        let Some(config) = self.config() else {
            return IndexMap::new();
        };
        config
            .remotes()
            .into_iter()
            .map(|(name, url)| {
                let url = normalize_remote_url(&url).unwrap_or(url);
                (name, url)
            })
            .collect()
    }

    /// Commits HEAD is ahead of and behind `<push remote>/<branch>`.
    ///
    /// The push remote comes from the config file, else the upstream's
    /// remote. Without either, or when git cannot count, both are 0.
    pub fn push_status(&self, branch: &str, facts: &BranchFacts) -> (u32, u32) {
        let Some(remote) = self
            .config()
            .and_then(|config| config.push_remote(branch))
            .or_else(|| facts.upstream_remote().map(str::to_string))
        else {
            log::debug!("no push remote for {branch}");
            return (0, 0);
        };
        let target = format!("{remote}/{branch}");
        let count = |range: String| {
            self.git
                .output(&["rev-list", "--count", &range])
                .and_then(|n| n.parse::<u32>().ok())
                .unwrap_or(0)
        };
        (
            count(format!("{target}..HEAD")),
            count(format!("HEAD..{target}")),
        )
    }

    /// Non-empty lines of the stash reflog.
    pub fn stash_count(&self) -> usize {
        self.fs
            .read(&format!("{}/logs/refs/stash", self.location.working_dir))
            .map_or(0, |log| log.lines().filter(|l| !l.trim().is_empty()).count())
    }

    pub fn worktree_count(&self) -> usize {
        self.fs
            .count_dirs(&format!("{}/worktrees", self.location.working_dir))
    }

    pub fn evaluate(&self) -> GitContext {
        let options = self.options;
        let location = &self.location;
        let fs = self.fs.as_ref();
        let git = self.git.as_ref();
        let branch_format = options.branch_format();
        let style = HeadStyle {
            icons: &options.icons,
            branch: &branch_format,
        };

        let report = if options.fetch_status {
            let in_merge = head::in_merge_or_rebase(fs, &location.metadata_dir);
            options
                .status_query(&location.real_dir)
                .run(git, in_merge)
        } else {
            StatusReport::default()
        };
        let branch = &report.branch;

        let current = head::current_head(branch, fs, git, &location.metadata_dir);
        let (push_ahead, push_behind) = match &current {
            HeadRef::Branch(name) if options.fetch_push_status => self.push_status(name, branch),
            _ => (0, 0),
        };
        let (head_context, head_display) = if options.fetch_status {
            let context = head::resolve(&ProbeInput {
                fs,
                git,
                dir: &location.metadata_dir,
                current: &current,
            });
            let display = style.render(&context);
            (context, display)
        } else {
            let display = style.label(&current);
            let context = match current {
                HeadRef::Branch(branch) => HeadContext::Clean { branch },
                HeadRef::Detached(target) => HeadContext::Detached { target },
            };
            (context, display)
        };

        let (upstream_icon, upstream_url) = match branch.upstream_remote() {
            Some(remote) if options.fetch_upstream_icon => {
                let raw = self.remote_url(remote).unwrap_or_default();
                let info = classify_upstream(&raw, &options.upstream_icons, &options.icons);
                (info.icon.clone(), info.url().to_string())
            }
            _ => (String::new(), String::new()),
        };

        GitContext {
            head_display,
            ref_name: branch.ref_name.clone(),
            hash: branch.hash.clone(),
            short_hash: branch.short_hash.clone(),
            working: report.working,
            staging: report.staging,
            ahead: branch.ahead,
            behind: branch.behind,
            push_ahead,
            push_behind,
            branch_status: branch_status(branch, &options.icons),
            upstream: branch.upstream.clone(),
            upstream_gone: branch.upstream_gone,
            upstream_icon,
            upstream_url,
            stash_count: if options.fetch_stash_count {
                self.stash_count()
            } else {
                0
            },
            worktree_count: if options.fetch_worktree_count {
                self.worktree_count()
            } else {
                0
            },
            is_work_tree: location.is_worktree(),
            is_bare: location.topology == Topology::Bare,
            repo_name: location.repo_name(),
            location: location.clone(),
            head: head_context,
            commit: options.fetch_commit.then(|| self.commit().clone()),
            remotes: if options.fetch_remotes {
                self.remotes()
            } else {
                IndexMap::new()
            },
        }
    }
}
