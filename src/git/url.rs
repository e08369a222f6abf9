//! Remote URL normalization and hosting provider detection.
//!
//! Remotes come in many historical shapes (`git@host:path`, `ssh://…:port/…`,
//! scp-like `host:path`, AWS's `codecommit::region://repo`). Each is rewritten
//! to the `https://host/path` form a browser would open, which also gives the
//! provider keywords a uniform string to match against.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use schemars::JsonSchema;
use serde::Serialize;

use crate::config::Icons;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("remote URL pattern is valid")
}

/// `/host/path/repo.git` and `host/path`: no scheme, no user, no colon.
static PATH_LIKE: LazyLock<Regex> = LazyLock::new(|| re(r"^/?(?P<path>[\w.\-~/]+)$"));

/// `ssh://[user@]host[:port]/path[.git][/]`, also ftp, git and rsync.
static SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^(?:ssh|ftp|git|rsync)://(?:[^@/]*@)?(?P<host>[\w.\-]+)(?::\d+)?/(?P<path>.+)$")
});

/// scp-like `host:path`.
static HOST_PATH: LazyLock<Regex> =
    LazyLock::new(|| re(r"^(?P<host>[\w.\-]+):(?P<path>[\w.\-~/]+)$"));

/// `codecommit::<region>://<repository>`.
static CODECOMMIT: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^codecommit::(?P<region>[a-z0-9\-]+)://(?P<repo>[\w.@:/\-~]+)$")
});

/// `git@ssh.dev.azure.com:v3/<org>/<project>/<repo>`.
static AZURE_SSH: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^[^@]+@ssh\.dev\.azure\.com:v3/(?P<org>[^/]+)/(?P<project>[^/]+)/(?P<repo>[^/]+?)/?$")
});

/// `user@host:path`.
static USER_HOST_PATH: LazyLock<Regex> =
    LazyLock::new(|| re(r"^.*@(?P<host>[^:/@]+):(?P<path>.+)$"));

/// Drop surrounding slashes and a trailing `.git`.
fn clean_path(path: &str) -> &str {
    let path = path.trim_matches('/');
    path.strip_suffix(".git").unwrap_or(path)
}

fn https(host: &str, path: &str) -> String {
    let path = clean_path(path);
    if path.is_empty() {
        format!("https://{host}")
    } else {
        format!("https://{host}/{path}")
    }
}

/// Rewrite a remote URL to `https://host/path`.
///
/// URLs starting with `http` are returned unchanged. Returns `None` when the
/// URL matches no known shape.
///
/// ```
/// use gitline::git::normalize_remote_url;
///
/// assert_eq!(
///     normalize_remote_url("git@github.com:owner/repo.git").as_deref(),
///     Some("https://github.com/owner/repo")
/// );
/// assert_eq!(normalize_remote_url(r"\share\repo.git"), None);
/// ```
pub fn normalize_remote_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http") {
        return Some(url.to_string());
    }
    if let Some(caps) = PATH_LIKE.captures(url) {
        let path = clean_path(&caps["path"]);
        return (!path.is_empty()).then(|| format!("https://{path}"));
    }
    if let Some(caps) = SCHEME.captures(url).or_else(|| HOST_PATH.captures(url)) {
        return Some(https(&caps["host"], &caps["path"]));
    }
    if let Some(caps) = CODECOMMIT.captures(url) {
        return Some(format!(
            "https://{}.console.aws.amazon.com/codesuite/codecommit/repositories/{}/browse",
            &caps["region"], &caps["repo"]
        ));
    }
    if let Some(caps) = AZURE_SSH.captures(url) {
        return Some(format!(
            "https://dev.azure.com/{}/{}/_git/{}",
            &caps["org"], &caps["project"], &caps["repo"]
        ));
    }
    let caps = USER_HOST_PATH.captures(url)?;
    Some(https(&caps["host"], &caps["path"]))
}

/// Known hosting services, checked in declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Provider {
    Github,
    Gitlab,
    Bitbucket,
    AzureDevops,
    Codecommit,
    Codeberg,
    /// Anything else, including user-configured hosts.
    Git,
}

impl Provider {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Provider::Github => &["github"],
            Provider::Gitlab => &["gitlab"],
            Provider::Bitbucket => &["bitbucket"],
            Provider::AzureDevops => &["dev.azure.com", "visualstudio.com"],
            Provider::Codecommit => &["codecommit"],
            Provider::Codeberg => &["codeberg"],
            Provider::Git => &[],
        }
    }

    /// First provider with a keyword contained in `url`.
    pub fn detect(url: &str) -> Provider {
        use strum::IntoEnumIterator;
        Provider::iter()
            .find(|provider| provider.keywords().iter().any(|k| url.contains(k)))
            .unwrap_or(Provider::Git)
    }

    pub fn icon(self, icons: &Icons) -> &str {
        match self {
            Provider::Github => &icons.github,
            Provider::Gitlab => &icons.gitlab,
            Provider::Bitbucket => &icons.bitbucket,
            Provider::AzureDevops => &icons.azure_devops,
            Provider::Codecommit => &icons.codecommit,
            Provider::Codeberg => &icons.codeberg,
            Provider::Git => &icons.git,
        }
    }
}

/// A remote URL with its normalized form and provider icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct UpstreamInfo {
    pub raw_url: String,
    /// `None` when the raw URL matched no known shape.
    pub normalized_url: Option<String>,
    pub provider: Provider,
    pub icon: String,
}

impl UpstreamInfo {
    /// Normalized URL, or the raw one when normalization failed.
    pub fn url(&self) -> &str {
        self.normalized_url.as_deref().unwrap_or(&self.raw_url)
    }
}

/// Normalize `raw_url` and pick its icon.
///
/// `overrides` maps URL substrings to icons and is consulted before the
/// built-in providers; a match there reports [`Provider::Git`].
pub fn classify_upstream(
    raw_url: &str,
    overrides: &IndexMap<String, String>,
    icons: &Icons,
) -> UpstreamInfo {
    let normalized_url = normalize_remote_url(raw_url);
    let target = normalized_url.as_deref().unwrap_or(raw_url);

    let (provider, icon) = match overrides.iter().find(|(key, _)| target.contains(key.as_str())) {
        Some((_, icon)) => (Provider::Git, icon.clone()),
        None => {
            let provider = Provider::detect(target);
            (provider, provider.icon(icons).to_string())
        }
    };

    UpstreamInfo {
        raw_url: raw_url.to_string(),
        normalized_url,
        provider,
        icon,
    }
}
