//! Single-level directory listing under a root boundary.

use std::fs;

use serde::Serialize;
use tracing::debug;

use crate::error::{BrowseError, Result};
use crate::path::{join_relative, RootBoundary};

/// Default recursion budget for listings.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Kind of a directory entry, taken from the filesystem's type bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Entry name (not full path).
    pub name: String,
    /// Root-relative path of the entry.
    pub path: String,
    /// Entry kind.
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Directory lister with a fixed depth budget.
///
/// Listings are never recursive; deeper levels are discovered by later
/// requests with an updated relative path. Entries are returned in the order
/// the filesystem yields them.
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    max_depth: usize,
    show_hidden: bool,
}

impl Default for DirectoryLister {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl DirectoryLister {
    /// Create a lister that refuses depths above `max_depth`.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            show_hidden: true,
        }
    }

    /// Set whether entries whose name starts with `.` are listed.
    pub fn show_hidden(mut self, show: bool) -> Self {
        self.show_hidden = show;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// List the immediate children of `relative`.
    ///
    /// Returns an empty listing when `depth` exceeds `max_depth`. Confinement
    /// rejections are propagated unchanged; enumeration failures surface as
    /// [`BrowseError::ReadDir`]. Children that cannot be read are skipped.
    pub fn list(&self, root: &RootBoundary, relative: &str, depth: usize) -> Result<Vec<Entry>> {
        if depth > self.max_depth {
            debug!(depth, max_depth = self.max_depth, "Listing depth exceeded");
            return Ok(Vec::new());
        }

        let resolved = root.resolve(relative)?;
        let entries = fs::read_dir(resolved.absolute()).map_err(BrowseError::ReadDir)?;

        let mut results = Vec::new();
        for entry_result in entries {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.show_hidden && name.starts_with('.') {
                continue;
            }

            // Does not follow symlinks.
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    debug!("Skipping entry {:?} with unknown type: {}", name, e);
                    continue;
                }
            };

            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };

            results.push(Entry {
                path: join_relative(resolved.relative(), &name),
                name,
                kind,
            });
        }

        Ok(results)
    }
}
