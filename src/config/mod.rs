//! Configuration for the git segment.
//!
//! A single TOML file (`~/.config/gitline/config.toml` by default) holds the
//! [`GitOptions`]: which facts to collect, per-repository status modes,
//! folders to skip, branch name shortening, and the [`Icons`] table.
//!
//! The file is optional. Every key has a default, and an absent file is the
//! same as an empty one.

mod icons;
mod options;

use std::path::PathBuf;
use std::sync::OnceLock;

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};

pub use icons::Icons;
pub use options::{BranchFormat, GitOptions};

/// Override for the config file location, set by `--config`.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "GITLINE_CONFIG_PATH";

/// Set the config path from the CLI. Only the first call has an effect.
pub fn set_config_path(path: PathBuf) {
    CONFIG_PATH.set(path).ok();
}

/// Get the config file path.
///
/// Priority:
/// 1. `--config` flag
/// 2. `GITLINE_CONFIG_PATH`
/// 3. `<config dir>/gitline/config.toml`
///
/// `choose_base_strategy` resolves the config dir to XDG locations on Linux
/// and macOS (`$XDG_CONFIG_HOME`, else `~/.config`) and `%APPDATA%` on Windows.
pub fn get_config_path() -> Option<PathBuf> {
    if let Some(path) = CONFIG_PATH.get() {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("gitline").join("config.toml"))
}

/// Load options from the resolved config path, or defaults when there is none.
pub fn load() -> anyhow::Result<GitOptions> {
    match get_config_path() {
        Some(path) => GitOptions::load(&path),
        None => Ok(GitOptions::default()),
    }
}
