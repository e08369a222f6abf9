//! Details of the commit at HEAD.

use schemars::JsonSchema;
use serde::Serialize;

use super::GitRunner;

/// `git log` arguments producing one `key:value` line per field.
pub const COMMIT_LOG_ARGS: &[&str] = &[
    "log",
    "-1",
    "--pretty=format:an:%an%nae:%ae%ncn:%cn%nce:%ce%nat:%at%nsu:%s%nha:%H%nrf:%D",
    "--decorate=full",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub name: String,
    pub email: String,
}

/// Refs decorating the commit, short names only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Refs {
    pub heads: Vec<String>,
    pub tags: Vec<String>,
    pub remotes: Vec<String>,
}

impl Refs {
    /// Parse `%D` with `--decorate=full`:
    /// `HEAD -> refs/heads/main, tag: refs/tags/v1, refs/remotes/origin/main`.
    fn parse(decorations: &str) -> Self {
        let mut refs = Refs::default();
        for item in decorations.split(',').map(str::trim) {
            let item = item.strip_prefix("HEAD -> ").unwrap_or(item);
            let item = item.strip_prefix("tag: ").unwrap_or(item);
            if item == "HEAD" || item.ends_with("/HEAD") {
                continue;
            }
            if let Some(head) = item.strip_prefix("refs/heads/") {
                refs.heads.push(head.to_string());
            } else if let Some(tag) = item.strip_prefix("refs/tags/") {
                refs.tags.push(tag.to_string());
            } else if let Some(remote) = item.strip_prefix("refs/remotes/") {
                refs.remotes.push(remote.to_string());
            }
        }
        refs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Commit {
    pub author: User,
    pub committer: User,
    pub subject: String,
    /// Author date, seconds since the epoch (0 when unknown).
    pub timestamp: i64,
    /// Author date as ISO 8601, empty when unknown.
    pub date: String,
    pub sha: String,
    pub refs: Refs,
}

impl Commit {
    /// Parse [`COMMIT_LOG_ARGS`] output. Unknown keys and malformed lines are skipped.
    pub fn parse(output: &str) -> Self {
        let mut commit = Commit::default();
        for line in output.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key {
                "an" => commit.author.name = value.to_string(),
                "ae" => commit.author.email = value.to_string(),
                "cn" => commit.committer.name = value.to_string(),
                "ce" => commit.committer.email = value.to_string(),
                "su" => commit.subject = value.to_string(),
                "ha" => commit.sha = value.to_string(),
                "rf" => commit.refs = Refs::parse(value),
                "at" => {
                    if let Ok(timestamp) = value.parse::<i64>()
                        && let Some(date) = chrono::DateTime::from_timestamp(timestamp, 0)
                    {
                        commit.timestamp = timestamp;
                        commit.date = date.format("%Y-%m-%dT%H:%M:%SZ").to_string();
                    }
                }
                _ => {}
            }
        }
        commit
    }

    /// Run `git log -1` for HEAD. An unborn branch gives an empty commit.
    pub fn load(git: &dyn GitRunner) -> Self {
        git.output(COMMIT_LOG_ARGS).map(|out| Self::parse(&out)).unwrap_or_default()
    }
}
