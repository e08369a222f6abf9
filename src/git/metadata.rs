//! Read-only access to files inside a repository's metadata directories.
//!
//! All paths are forward-slash strings as produced by the topology resolver.
//! Everything here is best effort: unreadable means absent.

use std::fs;

/// Filesystem queries the resolvers need.
pub trait MetadataFs {
    fn read(&self, path: &str) -> Option<String>;
    fn is_file(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;
    /// Number of sub-directories of `path`; 0 when it doesn't exist.
    fn count_dirs(&self, path: &str) -> usize;

    /// `<dir>/<file>` with surrounding spaces and line breaks removed.
    fn read_trimmed(&self, dir: &str, file: &str) -> Option<String> {
        self.read(&format!("{dir}/{file}"))
            .map(|content| content.trim_matches([' ', '\r', '\n']).to_string())
    }

    fn has_file(&self, dir: &str, file: &str) -> bool {
        self.is_file(&format!("{dir}/{file}"))
    }

    fn has_dir(&self, dir: &str, sub: &str) -> bool {
        self.is_dir(&format!("{dir}/{sub}"))
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl MetadataFs for DiskFs {
    fn read(&self, path: &str) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                log::trace!("cannot read {path}: {e}");
                None
            }
        }
    }

    fn is_file(&self, path: &str) -> bool {
        fs::metadata(path).is_ok_and(|m| m.is_file())
    }

    fn is_dir(&self, path: &str) -> bool {
        fs::metadata(path).is_ok_and(|m| m.is_dir())
    }

    fn count_dirs(&self, path: &str) -> usize {
        let Ok(entries) = fs::read_dir(path) else {
            return 0;
        };
        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .count()
    }
}
