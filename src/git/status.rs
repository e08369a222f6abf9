//! Porcelain v2 status parsing.
//!
//! `git status --branch --porcelain=2` prints `# branch.*` headers followed by
//! one line per changed path. The fixed column layout means the two status
//! codes are always at byte offsets 2 (index) and 3 (working tree):
//!
//! ```text
//! # branch.oid 5b1d4f7e0a…
//! # branch.head main
//! # branch.upstream origin/main
//! # branch.ab +1 -0
//! 1 .M N... 100644 100644 100644 e69de29 e69de29 src/lib.rs
//! 1 A. N... 000000 100644 100644 0000000 e69de29 src/new.rs
//! ? scratch.txt
//! ```

use std::fmt;

use schemars::JsonSchema;
use serde::Serialize;

use super::GitRunner;

/// The `branch.head` value git reports for a detached HEAD.
pub const DETACHED: &str = "(detached)";

/// Per-side change counts, one instance for the working tree and one for
/// the index.
///
/// `conflicted`, `missing` and `clean` belong to the record shape shared with
/// prompt templates; porcelain v2 output never increments them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct StatusCounts {
    pub added: u32,
    pub modified: u32,
    pub deleted: u32,
    pub moved: u32,
    pub unmerged: u32,
    pub untracked: u32,
    pub conflicted: u32,
    pub missing: u32,
    pub clean: u32,
    pub ignored: u32,
}

impl StatusCounts {
    /// Classify one status code character. Returns whether it was counted.
    fn add(&mut self, code: char) -> bool {
        let slot = match code {
            '.' => return false,
            'D' => &mut self.deleted,
            'A' => &mut self.added,
            'M' | 'R' | 'C' | 'm' | 'T' => &mut self.modified,
            'U' => &mut self.unmerged,
            _ => return false,
        };
        *slot += 1;
        true
    }

    pub fn total(&self) -> u32 {
        self.added
            + self.modified
            + self.deleted
            + self.moved
            + self.unmerged
            + self.untracked
            + self.conflicted
            + self.missing
            + self.clean
            + self.ignored
    }

    /// Whether anything worth showing in a prompt changed.
    pub fn changed(&self) -> bool {
        self.added > 0
            || self.deleted > 0
            || self.modified > 0
            || self.unmerged > 0
            || self.moved > 0
            || self.untracked > 0
    }

    /// `+added ~modified -deleted >moved xunmerged ?untracked`, zero counts
    /// omitted.
    pub fn summary(&self) -> String {
        [
            ('+', self.added),
            ('~', self.modified),
            ('-', self.deleted),
            ('>', self.moved),
            ('x', self.unmerged),
            ('?', self.untracked),
        ]
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(prefix, n)| format!("{prefix}{n}"))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Branch headers of one status run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct BranchFacts {
    /// Branch name, or [`DETACHED`].
    pub ref_name: String,
    pub hash: String,
    /// First 7 characters of `hash`; empty when `hash` is shorter.
    pub short_hash: String,
    pub upstream: String,
    pub upstream_gone: bool,
    pub ahead: u32,
    pub behind: u32,
}

impl BranchFacts {
    pub fn is_detached(&self) -> bool {
        self.ref_name == DETACHED
    }

    pub fn has_upstream(&self) -> bool {
        !self.upstream.is_empty()
    }

    /// Remote part of the upstream (`origin` for `origin/main`).
    pub fn upstream_remote(&self) -> Option<&str> {
        if !self.has_upstream() {
            return None;
        }
        Some(
            self.upstream
                .split_once('/')
                .map_or(self.upstream.as_str(), |(remote, _)| remote),
        )
    }
}

/// Upstream state gathered across the header block.
///
/// Only resolved once every line has been seen, so a `branch.ab` header
/// confirms the upstream wherever it appears.
#[derive(Debug, Default)]
enum UpstreamTracking {
    #[default]
    Unknown,
    Named(String),
    Counted {
        name: Option<String>,
        ahead: u32,
        behind: u32,
    },
}

impl UpstreamTracking {
    fn name(&mut self, upstream: &str) {
        *self = match std::mem::take(self) {
            UpstreamTracking::Counted { ahead, behind, .. } => UpstreamTracking::Counted {
                name: Some(upstream.to_string()),
                ahead,
                behind,
            },
            _ => UpstreamTracking::Named(upstream.to_string()),
        };
    }

    fn counts(&mut self, ahead: u32, behind: u32) {
        let name = match std::mem::take(self) {
            UpstreamTracking::Named(name) => Some(name),
            UpstreamTracking::Counted { name, .. } => name,
            UpstreamTracking::Unknown => None,
        };
        *self = UpstreamTracking::Counted {
            name,
            ahead,
            behind,
        };
    }

    fn resolve(self, branch: &mut BranchFacts) {
        match self {
            UpstreamTracking::Unknown => {}
            UpstreamTracking::Named(name) => {
                branch.upstream = name;
                branch.upstream_gone = true;
            }
            UpstreamTracking::Counted {
                name,
                ahead,
                behind,
            } => {
                branch.upstream = name.unwrap_or_default();
                branch.upstream_gone = false;
                branch.ahead = ahead;
                branch.behind = behind;
            }
        }
    }
}

/// Parsed output of one status run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct StatusReport {
    pub branch: BranchFacts,
    pub working: StatusCounts,
    pub staging: StatusCounts,
}

/// `+2 -1` → `(2, 1)`. Malformed values are 0; behind is the negated raw
/// value and a positive raw value counts as 0.
fn parse_ahead_behind(value: &str) -> (u32, u32) {
    let mut parts = value.split_whitespace();
    let ahead = parts
        .next()
        .and_then(|a| a.parse::<i64>().ok())
        .and_then(|a| u32::try_from(a).ok())
        .unwrap_or(0);
    let behind = parts
        .next()
        .and_then(|b| b.parse::<i64>().ok())
        .and_then(i64::checked_neg)
        .and_then(|b| u32::try_from(b).ok())
        .unwrap_or(0);
    (ahead, behind)
}

/// Parse `status --branch --porcelain=2` output.
///
/// `in_merge_or_rebase` makes `AA` entries (both sides added) count as a
/// single unmerged entry on the index side.
pub fn parse_porcelain_v2(output: &str, in_merge_or_rebase: bool) -> StatusReport {
    let mut report = StatusReport::default();
    let mut upstream = UpstreamTracking::default();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix("# ") {
            let (key, value) = header.split_once(' ').unwrap_or((header, ""));
            match key {
                "branch.oid" if value != "(initial)" => {
                    report.branch.hash = value.to_string();
                    if let Some(short) = value.get(..7) {
                        report.branch.short_hash = short.to_string();
                    }
                }
                "branch.head" if !value.is_empty() => report.branch.ref_name = value.to_string(),
                "branch.upstream" if !value.is_empty() => upstream.name(value),
                "branch.ab" => {
                    let (ahead, behind) = parse_ahead_behind(value);
                    upstream.counts(ahead, behind);
                }
                _ => {}
            }
            continue;
        }
        if line.starts_with('?') {
            report.working.untracked += 1;
            continue;
        }
        if line.starts_with('!') {
            report.working.ignored += 1;
            continue;
        }
        let Some(codes) = line.get(2..4) else {
            log::trace!("skipping short status line {line:?}");
            continue;
        };
        if in_merge_or_rebase && codes == "AA" {
            report.staging.unmerged += 1;
            continue;
        }
        let mut chars = codes.chars();
        if let (Some(staging), Some(working)) = (chars.next(), chars.next()) {
            report.staging.add(staging);
            report.working.add(working);
        }
    }

    upstream.resolve(&mut report.branch);
    report
}

/// Arguments of the status invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusQuery {
    /// `-u<mode>`: `no`, `normal` or `all`.
    pub untracked: String,
    /// `--ignore-submodules=<mode>` when set.
    pub ignore_submodules: Option<String>,
}

impl Default for StatusQuery {
    fn default() -> Self {
        Self {
            untracked: "normal".to_string(),
            ignore_submodules: None,
        }
    }
}

impl StatusQuery {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "status".to_string(),
            format!("-u{}", self.untracked),
            "--branch".to_string(),
            "--porcelain=2".to_string(),
        ];
        if let Some(mode) = &self.ignore_submodules {
            args.push(format!("--ignore-submodules={mode}"));
        }
        args
    }

    /// Run the status command. No output means an empty report.
    pub fn run(&self, git: &dyn GitRunner, in_merge_or_rebase: bool) -> StatusReport {
        let args = self.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match git.output(&args) {
            Some(output) => parse_porcelain_v2(&output, in_merge_or_rebase),
            None => StatusReport::default(),
        }
    }
}
