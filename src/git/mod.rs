//! Repository discovery and state.
//!
//! [`topology`] finds where a checkout's metadata lives, [`status`] parses
//! `git status`, [`head`] works out what HEAD is doing and [`url`] turns a
//! remote into a browsable URL and provider icon. All subprocesses go
//! through [`GitRunner`] and all metadata reads through [`MetadataFs`].

mod command;
mod commit;
mod error;
pub mod head;
mod metadata;
mod repo_config;
mod status;
pub mod topology;
mod url;

pub use command::{GitRunner, SystemGit};
pub use commit::{COMMIT_LOG_ARGS, Commit, Refs, User};
pub use error::LocateError;
pub use head::{DetachedTarget, HeadContext, HeadRef, HeadStyle, TheirsKind};
pub use metadata::{DiskFs, MetadataFs};
pub use repo_config::RepoConfig;
pub use status::{
    BranchFacts, DETACHED, StatusCounts, StatusQuery, StatusReport, parse_porcelain_v2,
};
pub use topology::{GitMarker, RepositoryLocation, Resolver, Topology};
pub use url::{Provider, UpstreamInfo, classify_upstream, normalize_remote_url};
