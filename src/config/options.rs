//! Segment options, read from TOML.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use regex::RegexBuilder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Icons;
use crate::git::StatusQuery;
use crate::path::home_dir;

/// Key in the per-repository maps that applies to every repository.
const ANY_REPOSITORY: &str = "*";

/// Options controlling what the git segment collects and how it renders.
///
/// # Example
///
/// ```toml
/// fetch-upstream-icon = true
/// fetch-stash-count = true
/// branch-max-length = 24
/// truncate-symbol = "…"
/// exclude-folders = ["~/scratch/.*"]
///
/// [untracked-modes]
/// "/home/me/huge-monorepo" = "no"
/// "*" = "normal"
///
/// [upstream-icons]
/// "git.internal.example" = "I "
///
/// [icons]
/// branch = "⎇ "
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct GitOptions {
    /// Run `git status` for counts, ahead/behind and in-progress operations.
    pub fetch_status: bool,
    /// Classify the upstream remote's URL into a provider icon.
    pub fetch_upstream_icon: bool,
    pub fetch_stash_count: bool,
    pub fetch_worktree_count: bool,
    /// Ask git whether the directory is a bare repository when no `.git`
    /// entry is found.
    pub fetch_bare_info: bool,
    /// Read author, committer and subject of HEAD.
    pub fetch_commit: bool,
    /// Collect every configured remote with its normalized URL.
    pub fetch_remotes: bool,
    /// Count commits ahead of and behind the branch on its push remote.
    pub fetch_push_status: bool,

    /// Untracked-files mode (`no`, `normal`, `all`) per repository directory.
    pub untracked_modes: IndexMap<String, String>,
    /// `--ignore-submodules` mode per repository directory.
    pub ignore_submodules: IndexMap<String, String>,
    /// Regexes matched against the checkout directory; a match hides the segment.
    pub exclude_folders: Vec<String>,
    /// URL substring → icon, checked before the built-in providers.
    pub upstream_icons: IndexMap<String, String>,

    /// Truncate branch names longer than this many characters (0: never).
    pub branch_max_length: usize,
    pub truncate_symbol: String,
    /// Show `feat/login` rather than `login`.
    pub full_branch_path: bool,

    pub git_command: String,
    pub icons: Icons,

    #[serde(flatten, skip_serializing)]
    #[schemars(skip)]
    pub unknown: BTreeMap<String, toml::Value>,
}

impl Default for GitOptions {
    fn default() -> Self {
        Self {
            fetch_status: true,
            fetch_upstream_icon: false,
            fetch_stash_count: false,
            fetch_worktree_count: false,
            fetch_bare_info: false,
            fetch_commit: false,
            fetch_remotes: false,
            fetch_push_status: false,
            untracked_modes: IndexMap::new(),
            ignore_submodules: IndexMap::new(),
            exclude_folders: Vec::new(),
            upstream_icons: IndexMap::new(),
            branch_max_length: 0,
            truncate_symbol: String::new(),
            full_branch_path: true,
            git_command: "git".to_string(),
            icons: Icons::default(),
            unknown: BTreeMap::new(),
        }
    }
}

impl GitOptions {
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let options: Self = toml::from_str(contents)?;
        for key in options.unknown.keys() {
            log::warn!("Ignoring unknown config key: {key}");
        }
        Ok(options)
    }

    /// Load options from `path`; a missing file means defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        Self::from_toml(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Keys the config file set that no option recognizes.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.unknown.keys().map(String::as_str)
    }

    fn per_repository<'a>(map: &'a IndexMap<String, String>, real_dir: &str) -> Option<&'a str> {
        map.get(real_dir)
            .or_else(|| map.get(ANY_REPOSITORY))
            .map(String::as_str)
            .filter(|mode| !mode.is_empty())
    }

    pub fn untracked_mode(&self, real_dir: &str) -> &str {
        Self::per_repository(&self.untracked_modes, real_dir).unwrap_or("normal")
    }

    pub fn ignore_submodules_mode(&self, real_dir: &str) -> Option<&str> {
        Self::per_repository(&self.ignore_submodules, real_dir)
    }

    pub fn status_query(&self, real_dir: &str) -> StatusQuery {
        StatusQuery {
            untracked: self.untracked_mode(real_dir).to_string(),
            ignore_submodules: self.ignore_submodules_mode(real_dir).map(str::to_string),
        }
    }

    /// The first `exclude-folders` pattern matching the whole of `dir`.
    ///
    /// `~` expands to the home directory. Matching ignores case on Windows.
    /// Patterns that fail to compile are skipped.
    pub fn excluded_by(&self, dir: &str) -> Option<&str> {
        let dir = dir.replace('\\', "/");
        self.exclude_folders.iter().map(String::as_str).find(|pattern| {
            let expanded = shellexpand::tilde_with_context(*pattern, || {
                home_dir().map(|home| home.to_string_lossy().into_owned())
            })
            .replace('\\', "/");
            match RegexBuilder::new(&format!("^(?:{expanded})$"))
                .case_insensitive(cfg!(windows))
                .build()
            {
                Ok(re) => re.is_match(&dir),
                Err(e) => {
                    log::warn!("Invalid exclude-folders pattern {pattern}: {e}");
                    false
                }
            }
        })
    }

    pub fn branch_format(&self) -> BranchFormat {
        BranchFormat {
            max_length: self.branch_max_length,
            truncate_symbol: self.truncate_symbol.clone(),
            full_path: self.full_branch_path,
        }
    }
}

/// Shortening applied to every branch name shown in HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFormat {
    pub max_length: usize,
    pub truncate_symbol: String,
    pub full_path: bool,
}

impl Default for BranchFormat {
    fn default() -> Self {
        Self {
            max_length: 0,
            truncate_symbol: String::new(),
            full_path: true,
        }
    }
}

impl BranchFormat {
    pub fn apply(&self, branch: &str) -> String {
        let branch = if self.full_path {
            branch
        } else {
            branch.rsplit_once('/').map_or(branch, |(_, last)| last)
        };
        if self.max_length == 0 || branch.chars().count() <= self.max_length {
            return branch.to_string();
        }
        let mut truncated: String = branch.chars().take(self.max_length).collect();
        truncated.push_str(&self.truncate_symbol);
        truncated
    }
}
