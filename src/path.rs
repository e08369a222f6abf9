//! Path syntax helpers.
//!
//! Repository locations are handled as strings in git's own forward-slash
//! convention, because the `.git` marker file and the worktree `gitdir` file
//! store them that way regardless of the host OS. How a relative `gitdir:`
//! target is joined onto its base depends on which path syntax is in effect,
//! so that logic sits behind [`PathSyntax`], with one implementation per
//! platform chosen once by [`native`].
//!
//! [`Wsl`] covers the one case where both syntaxes meet: a Linux shell under
//! WSL whose current directory is a Windows drive mounted at `/mnt/<drive>`.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Command;

use path_slash::PathExt as _;

use crate::shell_exec::run_stdout;

/// Lexical path operations for one platform's path syntax.
///
/// Inputs may use either separator; outputs always use `/`
/// except for [`PathSyntax::to_display`].
pub trait PathSyntax: Send + Sync {
    /// Length of the volume prefix (`C:` or `//server/share`), 0 when none.
    fn volume_len(&self, path: &str) -> usize;

    fn is_absolute(&self, path: &str) -> bool;

    /// Native rendering of a forward-slash path.
    fn to_display(&self, path: &str) -> String;

    /// Resolve `path` against `base`. Absolute paths pass through cleaned.
    fn join(&self, base: &str, path: &str) -> String {
        let path = path.replace('\\', "/");
        if self.is_absolute(&path) {
            return self.clean(&path);
        }
        self.clean(&format!("{}/{}", base.replace('\\', "/"), path))
    }

    /// Lexically remove `.`, `..`, repeated and trailing separators.
    ///
    /// `..` never climbs above the root of an absolute path; leading `..` of
    /// a relative path are kept.
    fn clean(&self, path: &str) -> String {
        let path = path.replace('\\', "/");
        let volume_len = self.volume_len(&path);
        let (volume, rest) = path.split_at(volume_len);
        let rooted = rest.starts_with('/');

        let mut parts: Vec<&str> = Vec::new();
        for part in rest.split('/') {
            match part {
                "" | "." => {}
                ".." => match parts.last() {
                    Some(&last) if last != ".." => {
                        parts.pop();
                    }
                    _ if rooted => {}
                    _ => parts.push(".."),
                },
                _ => parts.push(part),
            }
        }

        let mut cleaned = String::from(volume);
        if rooted {
            cleaned.push('/');
        }
        cleaned.push_str(&parts.join("/"));
        if cleaned.is_empty() {
            cleaned.push('.');
        }
        cleaned
    }
}

/// POSIX path syntax: `/` is the only separator and the only root.
#[derive(Debug, Clone, Copy, Default)]
pub struct Posix;

impl PathSyntax for Posix {
    fn volume_len(&self, _path: &str) -> usize {
        0
    }

    fn is_absolute(&self, path: &str) -> bool {
        path.starts_with('/')
    }

    fn to_display(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Windows path syntax: drive letters, UNC shares, and both separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct Windows;

impl PathSyntax for Windows {
    fn volume_len(&self, path: &str) -> usize {
        let bytes = path.as_bytes();
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            return 2;
        }
        // UNC: //server/share
        let is_sep = |b: u8| b == b'/' || b == b'\\';
        if bytes.len() > 2 && is_sep(bytes[0]) && is_sep(bytes[1]) && !is_sep(bytes[2]) {
            let Some(server_end) = bytes[2..].iter().position(|&b| is_sep(b)).map(|i| i + 2)
            else {
                return bytes.len();
            };
            let share_start = server_end + 1;
            if share_start >= bytes.len() || is_sep(bytes[share_start]) {
                return server_end;
            }
            return bytes[share_start..]
                .iter()
                .position(|&b| is_sep(b))
                .map_or(bytes.len(), |i| i + share_start);
        }
        0
    }

    /// Only fully qualified paths count: `C:/x` and `//server/share/x`.
    /// `C:x` (drive-relative) and `/x` (root of the current drive) do not.
    fn is_absolute(&self, path: &str) -> bool {
        let volume_len = self.volume_len(path);
        if volume_len == 0 {
            return false;
        }
        if volume_len > 2 {
            return true;
        }
        matches!(path.as_bytes().get(2), Some(b'/' | b'\\'))
    }

    fn to_display(&self, path: &str) -> String {
        path.replace('/', "\\")
    }

    fn join(&self, base: &str, path: &str) -> String {
        let path = path.replace('\\', "/");
        let base = base.replace('\\', "/");
        if self.is_absolute(&path) {
            return self.clean(&path);
        }
        let base_volume = &base[..self.volume_len(&base)];
        let path_volume_len = self.volume_len(&path);
        if path_volume_len > 0 {
            // Drive-relative: only resolvable against a base on the same drive.
            let (volume, rest) = path.split_at(path_volume_len);
            if !volume.eq_ignore_ascii_case(base_volume) {
                return self.clean(&path);
            }
            return self.clean(&format!("{base}/{rest}"));
        }
        if path.starts_with('/') {
            return self.clean(&format!("{base_volume}{path}"));
        }
        self.clean(&format!("{base}/{path}"))
    }
}

/// The path syntax of the platform gitline was built for.
pub fn native() -> &'static dyn PathSyntax {
    #[cfg(windows)]
    {
        &Windows
    }
    #[cfg(not(windows))]
    {
        &Posix
    }
}

/// Parent of a forward-slash path, or `None` at a root.
///
/// A parent that is a bare drive keeps its slash (`C:/.git` → `C:/`), so the
/// result stays absolute.
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    let idx = trimmed.rfind('/')?;
    if idx == 0 {
        return (trimmed.len() > 1).then_some("/");
    }
    let parent = &trimmed[..idx];
    if Windows.volume_len(parent) == 2 && parent.len() == 2 {
        return Some(&trimmed[..=idx]);
    }
    Some(parent)
}

/// Last component of a forward-slash path.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed
        .rfind(['/', '\\'])
        .map_or(trimmed, |idx| &trimmed[idx + 1..])
}

/// Forward-slash string form of a filesystem path.
pub fn to_slash(path: &Path) -> Cow<'_, str> {
    path.to_slash_lossy()
}

/// Bridge between WSL's Linux view of a Windows drive and git.exe's view.
///
/// Inside `/mnt/<drive>` a WSL shell has to use the Windows git binary so
/// that worktree and stash metadata written by Windows tools stay valid.
/// Paths crossing that boundary are translated with `wslpath`, falling back
/// to the lexical `/mnt/c/x` ⇄ `C:/x` mapping when it is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wsl {
    shared_drive: bool,
}

impl Wsl {
    /// Detect whether `cwd` is a Windows drive seen from WSL.
    pub fn detect(cwd: &Path) -> Self {
        let in_wsl = std::env::var_os("WSL_DISTRO_NAME").is_some()
            || std::fs::read_to_string("/proc/sys/kernel/osrelease")
                .is_ok_and(|release| release.to_ascii_lowercase().contains("microsoft"));
        let on_mount = to_slash(cwd).starts_with("/mnt/");
        let wsl = Self::new(cfg!(unix) && in_wsl && on_mount);
        if wsl.shared_drive {
            log::debug!("operating on a WSL shared drive: {}", cwd.display());
        }
        wsl
    }

    pub fn new(shared_drive: bool) -> Self {
        Self { shared_drive }
    }

    pub fn is_shared_drive(&self) -> bool {
        self.shared_drive
    }

    /// The git executable to use from here.
    pub fn git_command(&self, configured: &str) -> String {
        if self.shared_drive && !configured.ends_with(".exe") {
            format!("{configured}.exe")
        } else {
            configured.to_string()
        }
    }

    /// `/mnt/c/Users/x` → `C:/Users/x` when on a shared drive.
    pub fn to_windows(&self, path: &str) -> String {
        if !self.shared_drive {
            return path.to_string();
        }
        run_stdout(Command::new("wslpath").args(["-m", path]), None)
            .or_else(|| mnt_to_windows(path))
            .unwrap_or_else(|| path.to_string())
    }

    /// `C:/Users/x` → `/mnt/c/Users/x` when on a shared drive.
    pub fn to_linux(&self, path: &str) -> String {
        if !self.shared_drive {
            return path.to_string();
        }
        run_stdout(Command::new("wslpath").args(["-u", path]), None)
            .or_else(|| windows_to_mnt(path))
            .unwrap_or_else(|| path.to_string())
    }
}

/// Lexical `/mnt/<drive>/rest` → `<DRIVE>:/rest`.
pub fn mnt_to_windows(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/mnt/")?;
    let (drive, tail) = rest.split_once('/').unwrap_or((rest, ""));
    let mut chars = drive.chars();
    let letter = chars.next().filter(|c| c.is_ascii_alphabetic())?;
    if chars.next().is_some() {
        return None;
    }
    Some(format!("{}:/{}", letter.to_ascii_uppercase(), tail))
}

/// Lexical `<DRIVE>:/rest` (either separator) → `/mnt/<drive>/rest`.
pub fn windows_to_mnt(path: &str) -> Option<String> {
    if !Windows.is_absolute(path) || Windows.volume_len(path) != 2 {
        return None;
    }
    let letter = path.chars().next()?.to_ascii_lowercase();
    let tail = Windows.clean(&path[2..]);
    Some(format!("/mnt/{letter}{}", tail.trim_end_matches('/')))
}

/// Get the user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    home::home_dir()
}
