use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Glyphs used when rendering HEAD, branch status and upstream provider.
///
/// Defaults are Nerd Font code points. Every field can be overridden under
/// `[icons]` in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct Icons {
    pub branch: String,
    pub commit: String,
    pub tag: String,
    pub rebase: String,
    pub cherry_pick: String,
    pub revert: String,
    pub merge: String,
    pub no_commits: String,

    pub ahead: String,
    pub behind: String,
    pub gone: String,
    pub identical: String,

    pub github: String,
    pub gitlab: String,
    pub bitbucket: String,
    pub azure_devops: String,
    pub codecommit: String,
    pub codeberg: String,
    /// Upstream that matches no known provider.
    pub git: String,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            branch: "\u{E0A0}".into(),
            commit: "\u{F417}".into(),
            tag: "\u{F412}".into(),
            rebase: "\u{E728} ".into(),
            cherry_pick: "\u{E29B} ".into(),
            revert: "\u{F0E2} ".into(),
            merge: "\u{E727} ".into(),
            no_commits: "\u{F594} ".into(),

            ahead: "\u{2191}".into(),
            behind: "\u{2193}".into(),
            gone: "\u{2262}".into(),
            identical: "\u{2261}".into(),

            github: "\u{F408} ".into(),
            gitlab: "\u{F296} ".into(),
            bitbucket: "\u{F171} ".into(),
            azure_devops: "\u{EBE8} ".into(),
            codecommit: "\u{F270} ".into(),
            codeberg: "\u{F330} ".into(),
            git: "\u{E5FB} ".into(),
        }
    }
}

#[cfg(test)]
impl Icons {
    /// Readable icons for asserting rendered strings.
    pub(crate) fn plain() -> Self {
        Self {
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
}
