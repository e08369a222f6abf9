//! The git subprocess seam.
//!
//! Parsers and resolvers only ever see [`GitRunner`], so they can be driven by
//! canned output in tests. [`SystemGit`] is the real implementation.

use std::process::Command;

use crate::shell_exec::run_stdout;

/// Arguments placed before every subcommand so output stays parseable:
/// no lock contention with concurrent git processes, no quoting of
/// non-ASCII paths, no color codes.
const STABLE_ARGS: &[&str] = &[
    "--no-optional-locks",
    "-c",
    "core.quotepath=false",
    "-c",
    "color.status=false",
];

/// Runs git subcommands against one repository.
pub trait GitRunner {
    /// Run `git <args>` and return trimmed stdout.
    ///
    /// `None` covers every way of getting no answer: git missing, non-zero
    /// exit, or empty output.
    fn output(&self, args: &[&str]) -> Option<String>;
}

/// Invokes the git executable with `-C <dir>` and the stable argument set.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: String,
    dir: String,
}

impl SystemGit {
    pub fn new(program: impl Into<String>, dir: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }
}

impl GitRunner for SystemGit {
    fn output(&self, args: &[&str]) -> Option<String> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-C").arg(&self.dir).args(STABLE_ARGS).args(args);
        run_stdout(&mut cmd, Some(&self.dir))
    }
}

impl<T: GitRunner + ?Sized> GitRunner for &T {
    fn output(&self, args: &[&str]) -> Option<String> {
        (**self).output(args)
    }
}
