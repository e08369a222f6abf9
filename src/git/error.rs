//! Absence conditions raised while locating a repository.
//!
//! None of these are failures from the user's point of view: each one means
//! "there is nothing to show here". They are typed so callers can tell them
//! apart from real errors (a broken config file, an unreadable directory)
//! after conversion into `anyhow::Error`:
//!
//! ```ignore
//! match GitSegment::locate(dir, &options) {
//!     Err(e) if LocateError::is_absence(&e) => {}  // print nothing
//!     Err(e) => return Err(e),
//!     Ok(segment) => render(segment.evaluate()),
//! }
//! ```

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    /// No `.git` marker above the start directory, and it is not bare.
    NotFound { start: String },
    /// The git executable is not on `PATH`.
    GitNotInstalled { command: String },
    /// The checkout matched one of the configured `exclude-folders`.
    Excluded { dir: String, pattern: String },
    /// A `.git` file whose `gitdir:` target matches no known layout.
    UnrecognizedGitFile { marker: String, target: String },
}

impl LocateError {
    /// Whether `error` is (or wraps) a [`LocateError`].
    pub fn is_absence(error: &anyhow::Error) -> bool {
        error.downcast_ref::<LocateError>().is_some()
    }
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::NotFound { start } => {
                write!(f, "Not a git repository (or any parent): {start}")
            }
            LocateError::GitNotInstalled { command } => {
                write!(f, "Git executable not found: {command}")
            }
            LocateError::Excluded { dir, pattern } => {
                write!(f, "Repository {dir} is excluded by pattern {pattern}")
            }
            LocateError::UnrecognizedGitFile { marker, target } => {
                write!(f, "Unrecognized gitdir target {target} in {marker}")
            }
        }
    }
}

impl std::error::Error for LocateError {}
