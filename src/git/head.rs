//! What HEAD is doing: on a branch, detached, or in the middle of a rebase,
//! merge, cherry-pick or revert.
//!
//! Git records in-progress operations as marker files in the checkout's
//! metadata directory. [`PROBES`] lists them in priority order; the first
//! probe that produces a context wins, and a checkout with no markers falls
//! back to [`HeadContext::Clean`] or [`HeadContext::Detached`].

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::Serialize;

use super::metadata::MetadataFs;
use super::status::BranchFacts;
use super::GitRunner;
use crate::config::{BranchFormat, Icons};

const BRANCH_PREFIX: &str = "refs/heads/";
/// Placeholder HEAD written by the reftable backend.
const REFTABLE_HEAD: &str = "ref: refs/heads/.invalid";

static MERGE_MSG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Merge (?:remote-tracking )?(branch|commit|tag) '(.*?)'")
        .expect("merge message regex is valid")
});

static TODO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(p|pick|revert)\s+(\S+)").expect("sequencer todo regex is valid")
});

/// First 7 characters of a commit id.
pub fn short_sha(sha: &str) -> &str {
    sha.char_indices().nth(7).map_or(sha, |(idx, _)| &sha[..idx])
}

/// What a detached HEAD points at, in display preference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum DetachedTarget {
    /// A tag pointing exactly at HEAD.
    Tag(String),
    /// Short commit id.
    Commit(String),
    /// Unborn repository.
    NoCommits,
}

/// The checkout's own position, independent of any operation in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum HeadRef {
    Branch(String),
    Detached(DetachedTarget),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TheirsKind {
    Branch,
    Commit,
    Tag,
}

/// The single active HEAD state of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum HeadContext {
    Clean {
        branch: String,
    },
    Detached {
        target: DetachedTarget,
    },
    /// Interactive or merge-backend rebase (`rebase-merge/`).
    RebaseMerge {
        origin: HeadRef,
        onto: String,
        step: u32,
        total: u32,
        at: HeadRef,
    },
    /// Patch-based rebase (`rebase-apply/`).
    RebaseApply {
        origin: HeadRef,
        step: u32,
        total: u32,
        at: HeadRef,
    },
    Merge {
        theirs_kind: TheirsKind,
        theirs: String,
        ours: HeadRef,
    },
    CherryPick {
        sha: String,
        ours: HeadRef,
    },
    Revert {
        sha: String,
        ours: HeadRef,
    },
    /// Multi-commit cherry-pick paused between picks.
    SequencerPick {
        sha: String,
        ours: HeadRef,
    },
    SequencerRevert {
        sha: String,
        ours: HeadRef,
    },
}

/// Icons and branch shortening used to render HEAD.
pub struct HeadStyle<'a> {
    pub icons: &'a Icons,
    pub branch: &'a BranchFormat,
}

impl HeadStyle<'_> {
    /// Label of `head` on its own: `⎇ main`, ` v1.0`, ` 1234567`.
    pub fn label(&self, head: &HeadRef) -> String {
        match head {
            HeadRef::Branch(name) => self.branch_label(name),
            HeadRef::Detached(DetachedTarget::Tag(tag)) => format!("{}{tag}", self.icons.tag),
            HeadRef::Detached(DetachedTarget::Commit(sha)) => {
                format!("{}{}", self.icons.commit, short_sha(sha))
            }
            HeadRef::Detached(DetachedTarget::NoCommits) => self.icons.no_commits.clone(),
        }
    }

    /// Label of `head` as the receiving side of an operation, spelling out
    /// a detached HEAD.
    pub fn ours(&self, head: &HeadRef) -> String {
        match head {
            HeadRef::Branch(_) => self.label(head),
            HeadRef::Detached(_) => format!("{}detached at {}", self.icons.branch, self.label(head)),
        }
    }

    fn branch_label(&self, name: &str) -> String {
        format!("{}{}", self.icons.branch, self.branch.apply(name))
    }

    fn commit_label(&self, sha: &str) -> String {
        format!("{}{}", self.icons.commit, short_sha(sha))
    }

    pub fn render(&self, context: &HeadContext) -> String {
        let icons = self.icons;
        match context {
            HeadContext::Clean { branch } => self.branch_label(branch),
            HeadContext::Detached { target } => self.ours(&HeadRef::Detached(target.clone())),
            HeadContext::RebaseMerge {
                origin,
                onto,
                step,
                total,
                at,
            } => format!(
                "{}{} onto {} ({step}/{total}) at {}",
                icons.rebase,
                self.ours(origin),
                self.branch_label(onto),
                self.label(at)
            ),
            HeadContext::RebaseApply {
                origin,
                step,
                total,
                at,
            } => format!(
                "{}{} ({step}/{total}) at {}",
                icons.rebase,
                self.ours(origin),
                self.label(at)
            ),
            HeadContext::Merge {
                theirs_kind,
                theirs,
                ours,
            } => {
                let theirs = match theirs_kind {
                    TheirsKind::Branch => self.branch_label(theirs),
                    TheirsKind::Commit => self.commit_label(theirs),
                    TheirsKind::Tag => format!("{}{theirs}", icons.tag),
                };
                format!("{}{theirs} into {}", icons.merge, self.ours(ours))
            }
            HeadContext::CherryPick { sha, ours } | HeadContext::SequencerPick { sha, ours } => {
                format!(
                    "{}{} onto {}",
                    icons.cherry_pick,
                    self.commit_label(sha),
                    self.ours(ours)
                )
            }
            HeadContext::Revert { sha, ours } | HeadContext::SequencerRevert { sha, ours } => {
                format!(
                    "{}{} onto {}",
                    icons.revert,
                    self.commit_label(sha),
                    self.ours(ours)
                )
            }
        }
    }
}

/// Everything a probe may look at.
pub struct ProbeInput<'a> {
    pub fs: &'a dyn MetadataFs,
    pub git: &'a dyn GitRunner,
    /// The checkout's metadata directory.
    pub dir: &'a str,
    pub current: &'a HeadRef,
}

impl ProbeInput<'_> {
    fn read(&self, file: &str) -> Option<String> {
        self.fs.read_trimmed(self.dir, file)
    }

    fn counter(&self, file: &str) -> u32 {
        self.read(file)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0)
    }

    /// `head-name` of a rebase: the branch being rebased, or the current
    /// detached HEAD.
    fn rebase_origin(&self, file: &str) -> HeadRef {
        match self.read(file) {
            Some(name) if name != "detached HEAD" && !name.is_empty() => {
                HeadRef::Branch(name.replacen(BRANCH_PREFIX, "", 1))
            }
            _ => self.current.clone(),
        }
    }
}

type Probe = fn(&ProbeInput<'_>) -> Option<HeadContext>;

/// In-progress operation probes, highest priority first.
pub const PROBES: &[(&str, Probe)] = &[
    ("rebase-merge", rebase_merge),
    ("rebase-apply", rebase_apply),
    ("merge", merge),
    ("cherry-pick", cherry_pick),
    ("revert", revert),
    ("sequencer", sequencer),
];

fn rebase_merge(input: &ProbeInput<'_>) -> Option<HeadContext> {
    if !input.fs.has_dir(input.dir, "rebase-merge") {
        return None;
    }
    let onto_sha = input.read("rebase-merge/onto").unwrap_or_default();
    let onto = input
        .git
        .output(&["name-rev", "--name-only", "--exclude=tags/*", &onto_sha])
        .unwrap_or_else(|| short_sha(&onto_sha).to_string());
    Some(HeadContext::RebaseMerge {
        origin: input.rebase_origin("rebase-merge/head-name"),
        onto,
        step: input.counter("rebase-merge/msgnum"),
        total: input.counter("rebase-merge/end"),
        at: input.current.clone(),
    })
}

fn rebase_apply(input: &ProbeInput<'_>) -> Option<HeadContext> {
    if !input.fs.has_dir(input.dir, "rebase-apply") {
        return None;
    }
    Some(HeadContext::RebaseApply {
        origin: input.rebase_origin("rebase-apply/head-name"),
        step: input.counter("rebase-apply/next"),
        total: input.counter("rebase-apply/last"),
        at: input.current.clone(),
    })
}

fn merge(input: &ProbeInput<'_>) -> Option<HeadContext> {
    let message = input.read("MERGE_MSG")?;
    let captures = MERGE_MSG_RE.captures(&message)?;
    let theirs = captures.get(2)?.as_str();
    if theirs.is_empty() {
        return None;
    }
    let theirs_kind = captures.get(1)?.as_str().parse().ok()?;
    Some(HeadContext::Merge {
        theirs_kind,
        theirs: theirs.to_string(),
        ours: input.current.clone(),
    })
}

fn cherry_pick(input: &ProbeInput<'_>) -> Option<HeadContext> {
    if !input.fs.has_file(input.dir, "CHERRY_PICK_HEAD") {
        return None;
    }
    Some(HeadContext::CherryPick {
        sha: input.read("CHERRY_PICK_HEAD").unwrap_or_default(),
        ours: input.current.clone(),
    })
}

fn revert(input: &ProbeInput<'_>) -> Option<HeadContext> {
    if !input.fs.has_file(input.dir, "REVERT_HEAD") {
        return None;
    }
    Some(HeadContext::Revert {
        sha: input.read("REVERT_HEAD").unwrap_or_default(),
        ours: input.current.clone(),
    })
}

/// A sequence of picks or reverts paused after a conflict was committed;
/// `CHERRY_PICK_HEAD`/`REVERT_HEAD` are gone but `sequencer/todo` remains.
fn sequencer(input: &ProbeInput<'_>) -> Option<HeadContext> {
    let todo = input.read("sequencer/todo")?;
    let line = todo
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))?;
    let captures = TODO_RE.captures(line)?;
    let sha = captures.get(2)?.as_str().to_string();
    let ours = input.current.clone();
    match captures.get(1)?.as_str() {
        "revert" => Some(HeadContext::SequencerRevert { sha, ours }),
        _ => Some(HeadContext::SequencerPick { sha, ours }),
    }
}

/// Resolve the active context: the first matching probe, else the checkout's
/// own position.
pub fn resolve(input: &ProbeInput<'_>) -> HeadContext {
    for (name, probe) in PROBES {
        if let Some(context) = probe(input) {
            log::debug!("HEAD context: {name} in progress");
            return context;
        }
    }
    match input.current {
        HeadRef::Branch(branch) => HeadContext::Clean {
            branch: branch.clone(),
        },
        HeadRef::Detached(target) => HeadContext::Detached {
            target: target.clone(),
        },
    }
}

/// Whether a merge or rebase is in progress, which changes how status
/// reports entries added on both sides.
pub fn in_merge_or_rebase(fs: &dyn MetadataFs, dir: &str) -> bool {
    fs.has_dir(dir, "rebase-merge")
        || fs.has_dir(dir, "rebase-apply")
        || fs.has_file(dir, "MERGE_HEAD")
}

/// Contents of the `HEAD` file.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HeadFile {
    Branch(String),
    Commit(String),
    Unknown,
}

fn read_head_file(fs: &dyn MetadataFs, git: &dyn GitRunner, dir: &str) -> HeadFile {
    let Some(head) = fs.read_trimmed(dir, "HEAD") else {
        return HeadFile::Unknown;
    };
    if head == REFTABLE_HEAD {
        return match git.output(&["rev-parse", "--symbolic-full-name", "HEAD"]) {
            Some(full) if full.starts_with(BRANCH_PREFIX) => {
                HeadFile::Branch(full[BRANCH_PREFIX.len()..].to_string())
            }
            _ => HeadFile::Unknown,
        };
    }
    if let Some(branch) = head.strip_prefix("ref: refs/heads/") {
        return HeadFile::Branch(branch.to_string());
    }
    match head.get(..7) {
        Some(short) if !head.starts_with("ref:") => HeadFile::Commit(short.to_string()),
        _ => HeadFile::Unknown,
    }
}

fn detached_target(git: &dyn GitRunner, short_hash: &str) -> DetachedTarget {
    if let Some(tag) = git.output(&["describe", "--tags", "--exact-match"]) {
        return DetachedTarget::Tag(tag);
    }
    if !short_hash.is_empty() {
        return DetachedTarget::Commit(short_hash.to_string());
    }
    match git.output(&["rev-parse", "HEAD"]) {
        Some(sha) if sha.len() >= 7 => DetachedTarget::Commit(short_sha(&sha).to_string()),
        _ => DetachedTarget::NoCommits,
    }
}

/// The checkout's position.
///
/// Uses the branch facts from a status run when available; with an empty
/// `branch.ref_name` (status not fetched or failed) the `HEAD` file is read
/// instead.
pub fn current_head(
    branch: &BranchFacts,
    fs: &dyn MetadataFs,
    git: &dyn GitRunner,
    dir: &str,
) -> HeadRef {
    if !branch.ref_name.is_empty() && !branch.is_detached() {
        return HeadRef::Branch(branch.ref_name.clone());
    }
    let mut short_hash = branch.short_hash.clone();
    if branch.ref_name.is_empty() {
        match read_head_file(fs, git, dir) {
            HeadFile::Branch(name) => return HeadRef::Branch(name),
            HeadFile::Commit(short) => short_hash = short,
            HeadFile::Unknown => {}
        }
    }
    HeadRef::Detached(detached_target(git, &short_hash))
}
