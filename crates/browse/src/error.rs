//! Error types for the browse crate.

use std::io;

use thiserror::Error;

/// Terminal failure of a single browse request.
///
/// None of these carry absolute filesystem paths, so their `Display` output is
/// safe to show to a client.
#[derive(Debug, Error)]
pub enum BrowseError {
    /// The requested path escapes the root boundary.
    #[error("access denied")]
    PermissionDenied,

    /// The requested path does not exist under the root.
    #[error("not found")]
    NotFound,

    /// The path exists but its metadata could not be read.
    #[error("failed to stat path: {0}")]
    Stat(#[source] io::Error),

    /// Directory enumeration failed after the path was resolved.
    #[error("failed to read directory: {0}")]
    ReadDir(#[source] io::Error),

    /// File content could not be read after the path was resolved.
    #[error("failed to read file: {0}")]
    ReadFile(#[source] io::Error),
}

impl BrowseError {
    /// Classify a metadata lookup failure.
    ///
    /// A name the OS cannot represent (an interior NUL byte) names nothing, so
    /// it is reported as missing.
    pub(crate) fn from_stat(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => BrowseError::NotFound,
            _ => BrowseError::Stat(err),
        }
    }

    /// Whether this error is the confinement rejection.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, BrowseError::PermissionDenied)
    }
}

/// Result type alias for browse operations.
pub type Result<T> = std::result::Result<T, BrowseError>;
