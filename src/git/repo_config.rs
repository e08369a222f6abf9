//! The repository's own `config` file.
//!
//! Only what the segment needs: `core.bare`, remote URLs and the push remote
//! of a branch. Reading the file directly saves a `git config` subprocess per
//! lookup. `include.path` entries are not followed.
//!
//! ```ini
//! [core]
//!     bare = false
//! [remote "origin"]
//!     url = git@github.com:owner/repo.git
//! [branch "main"]
//!     remote = origin
//! ```

use std::borrow::Cow;
use std::str::FromStr;

use bstr::BStr;
use gix_config::{Boolean, File};
use indexmap::IndexMap;

/// Parsed `config` file of one repository.
///
/// Section and key names are case-insensitive, subsection names are not, and
/// the last assignment wins, as in git.
pub struct RepoConfig {
    file: File<'static>,
}

impl RepoConfig {
    /// Parse `contents`. `None` when git itself would refuse the file.
    pub fn parse(contents: &str) -> Option<Self> {
        match File::from_str(contents) {
            Ok(file) => Some(Self { file }),
            Err(e) => {
                log::debug!("unparseable git config: {e}");
                None
            }
        }
    }

    fn raw<'a>(&'a self, section: &'a str, subsection: Option<&str>, key: &str) -> Option<Cow<'a, BStr>> {
        self.file
            .sections_by_name(section)?
            .filter(|s| match (s.header().subsection_name(), subsection) {
                (None, None) => true,
                (Some(name), Some(wanted)) => name == wanted.as_bytes(),
                _ => false,
            })
            .filter_map(|s| s.value(key))
            .last()
    }

    /// Value of `section[.subsection].key`, e.g.
    /// `value("branch", Some("main"), "remote")`. Empty values are `None`.
    pub fn value(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<String> {
        self.raw(section, subsection, key)
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
    }

    pub fn is_bare(&self) -> bool {
        self.raw("core", None, "bare")
            .is_some_and(|value| Boolean::try_from(&*value).is_ok_and(|b| b.0))
    }

    pub fn remote_url(&self, remote: &str) -> Option<String> {
        self.value("remote", Some(remote), "url")
    }

    /// Every remote with a non-empty `url`, in file order.
    pub fn remotes(&self) -> IndexMap<String, String> {
        let mut remotes = IndexMap::new();
        let Some(sections) = self.file.sections_by_name("remote") else {
            return remotes;
        };
        for section in sections {
            let Some(name) = section.header().subsection_name() else {
                continue;
            };
            if let Some(url) = section.value("url").filter(|url| !url.is_empty()) {
                remotes.insert(name.to_string(), url.to_string());
            }
        }
        remotes
    }

    /// The remote `git push` picks for `branch`: `branch.<name>.pushRemote`,
    /// then `remote.pushDefault`, then `branch.<name>.remote`.
    pub fn push_remote(&self, branch: &str) -> Option<String> {
        self.value("branch", Some(branch), "pushRemote")
            .or_else(|| self.value("remote", None, "pushDefault"))
            .or_else(|| self.value("branch", Some(branch), "remote"))
    }
}
