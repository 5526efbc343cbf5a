//! Request orchestration: one path query in, one outcome out.
//!
//! The orchestrator composes path resolution, listing and classification into
//! a single pass per request:
//!
//! ```text
//! resolve ──► stat ──┬─► directory ─► list (depth 1) ─► sort ─► Page
//!    │               └─► file ─► classify ─┬─► Image/Video ─► Stream (inline)
//!    ▼                                     ├─► Archive ─────► Stream (attachment)
//! PermissionDenied                         └─► PlainText ───► Page (text)
//! ```
//!
//! Every failure is terminal and no partial view model is ever produced.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::classify::{Category, Disposition};
use crate::error::{BrowseError, Result};
use crate::listing::{DirectoryLister, DEFAULT_MAX_DEPTH};
use crate::path::{parent_of, RootBoundary, ROOT_MARKER};
use crate::view::{sort_entries, FilePayload, ViewBody, ViewModel};

/// Depth at which every request lists its directory.
pub const LISTING_DEPTH: usize = 1;

/// Default cap on text previews (4MB).
pub const DEFAULT_PREVIEW_MAX_BYTES: u64 = 4 * 1024 * 1024;

/// Tunables for [`RequestOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseOptions {
    /// Maximum depth for the directory lister.
    pub max_depth: usize,
    /// List entries whose name starts with `.`.
    pub show_hidden: bool,
    /// Files larger than this are not read for text preview.
    pub preview_max_bytes: u64,
    /// Re-check confinement against the symlink-resolved path.
    pub enforce_real_path: bool,
}

impl Default for BrowseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            show_hidden: true,
            preview_max_bytes: DEFAULT_PREVIEW_MAX_BYTES,
            enforce_real_path: true,
        }
    }
}

/// Result of a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Render the view model.
    Page(ViewModel),
    /// Stream the file bytes, bypassing rendering.
    Stream(StreamTarget),
}

/// A file to hand to the transport for streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget {
    /// Confined absolute path of the file.
    pub path: PathBuf,
    /// Base name of the file.
    pub file_name: String,
    pub category: Category,
    pub disposition: Disposition,
}

/// Turns a raw `path` query into an [`Outcome`].
///
/// Stateless across requests; safe to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RequestOrchestrator {
    root: RootBoundary,
    lister: DirectoryLister,
    preview_max_bytes: u64,
    enforce_real_path: bool,
}

impl RequestOrchestrator {
    pub fn new(root: RootBoundary, options: BrowseOptions) -> Self {
        Self {
            root,
            lister: DirectoryLister::new(options.max_depth).show_hidden(options.show_hidden),
            preview_max_bytes: options.preview_max_bytes,
            enforce_real_path: options.enforce_real_path,
        }
    }

    pub fn root(&self) -> &RootBoundary {
        &self.root
    }

    /// Handle one request. `None` or an empty string means the root.
    pub fn handle(&self, raw_path: Option<&str>) -> Result<Outcome> {
        let relative = match raw_path {
            Some(p) if !p.is_empty() => p,
            _ => ROOT_MARKER,
        };

        let resolved = self.root.resolve(relative).inspect_err(|_| {
            warn!("Rejected request for path outside root");
        })?;

        let metadata = fs::metadata(resolved.absolute()).map_err(BrowseError::from_stat)?;

        let target = if self.enforce_real_path {
            self.root.confine_real(&resolved).inspect_err(|e| {
                if e.is_permission_denied() {
                    warn!("Rejected request for link resolving outside root");
                }
            })?
        } else {
            resolved.absolute().to_path_buf()
        };

        let current_path = resolved.relative().to_string();
        let parent_path = parent_of(&current_path);

        if metadata.is_dir() {
            let mut entries = self
                .lister
                .list(&self.root, &current_path, LISTING_DEPTH)?;
            sort_entries(&mut entries);
            debug!(path = %current_path, count = entries.len(), "Listed directory");

            return Ok(Outcome::Page(ViewModel {
                current_path,
                parent_path,
                body: ViewBody::Directory { entries },
            }));
        }

        if !metadata.is_file() {
            return Err(BrowseError::ReadFile(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let file_name = resolved.file_name().unwrap_or_default();
        let category = Category::classify(&file_name);

        if let Some(disposition) = category.disposition() {
            debug!(path = %current_path, ?category, "Streaming file");
            return Ok(Outcome::Stream(StreamTarget {
                path: target,
                file_name,
                category,
                disposition,
            }));
        }

        let payload = read_preview(&target, metadata.len(), self.preview_max_bytes)?;
        Ok(Outcome::Page(ViewModel {
            current_path,
            parent_path,
            body: ViewBody::File {
                name: file_name,
                payload,
            },
        }))
    }
}

/// Read a file for text display, up to `limit` bytes.
fn read_preview(path: &Path, size: u64, limit: u64) -> Result<FilePayload> {
    if size > limit {
        return Ok(FilePayload::TooLarge { size, limit });
    }

    let file = File::open(path).map_err(BrowseError::ReadFile)?;
    let mut bytes = Vec::with_capacity(size as usize);
    // One extra byte detects files that grew since the stat.
    file.take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(BrowseError::ReadFile)?;

    let read = bytes.len() as u64;
    if read > limit {
        return Ok(FilePayload::TooLarge {
            size: size.max(read),
            limit,
        });
    }

    Ok(match String::from_utf8(bytes) {
        Ok(content) => FilePayload::Text {
            content,
            lossy: false,
        },
        Err(e) => FilePayload::Text {
            content: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            lossy: true,
        },
    })
}
