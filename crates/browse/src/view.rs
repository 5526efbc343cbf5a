//! Per-request view model handed to the renderer.

use std::cmp::Ordering;

use serde::Serialize;

use crate::listing::Entry;

/// Fully populated output of one browse request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    /// Normalized relative path of the request, `"."` at the root.
    pub current_path: String,
    /// Relative path one level up, clamped at the root.
    pub parent_path: String,
    /// Directory entries or file payload.
    pub body: ViewBody,
}

impl ViewModel {
    pub fn is_root(&self) -> bool {
        self.current_path == crate::path::ROOT_MARKER
    }
}

/// What the view displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewBody {
    /// A directory listing, already in display order.
    Directory { entries: Vec<Entry> },
    /// A file shown as text.
    File { name: String, payload: FilePayload },
}

/// Text preview of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FilePayload {
    /// File content decoded as UTF-8. `lossy` is set when invalid sequences
    /// were replaced.
    Text { content: String, lossy: bool },
    /// File exceeds the preview cap and was not read.
    TooLarge { size: u64, limit: u64 },
}

/// Order entries for display: directories first, then case-insensitive by
/// name within each kind.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    });
}
