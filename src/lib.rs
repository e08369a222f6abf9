//! Git repository context for shell prompt segments.
//!
//! Given a directory, gitline finds the enclosing repository (plain clone,
//! linked worktree, submodule, `--separate-git-dir` or bare), runs a single
//! `git status`, and reports what a prompt wants to show: the branch or
//! in-progress operation, ahead/behind counts, working tree and index
//! changes, stash and worktree counts, and the upstream's hosting provider.
//!
//! ```no_run
//! use gitline::config::GitOptions;
//! use gitline::git::LocateError;
//! use gitline::segment::GitSegment;
//!
//! let options = GitOptions::default();
//! match GitSegment::locate(std::path::Path::new("."), &options) {
//!     Ok(segment) => println!("{}", segment.evaluate().to_text()),
//!     Err(e) if LocateError::is_absence(&e) => {}
//!     Err(e) => eprintln!("{e:#}"),
//! }
//! ```

pub mod config;
pub mod git;
pub mod path;
pub mod segment;
pub mod shell_exec;
