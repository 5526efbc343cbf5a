//! # Videobrowser Core
//!
//! Root-confined browsing logic shared by the Videobrowser server.
//!
//! ## Overview
//!
//! Every request runs through the same single pass:
//!
//! - **Path resolution**: client paths are lexically confined to a [`RootBoundary`]
//! - **Parent navigation**: [`parent_of`] never rises above the root
//! - **Directory listing**: [`DirectoryLister`] enumerates one level, bounded by a depth budget
//! - **Classification**: [`Category`] maps a file name to its response treatment
//! - **Orchestration**: [`RequestOrchestrator`] composes the above into an [`Outcome`]
//!
//! Nothing here keeps state between requests, and nothing here speaks HTTP.
//!
//! ## Example
//!
//! ```rust,no_run
//! use browse::{BrowseOptions, Outcome, RequestOrchestrator, RootBoundary};
//!
//! fn main() -> std::io::Result<()> {
//!     let root = RootBoundary::new("/srv/media")?;
//!     let orchestrator = RequestOrchestrator::new(root, BrowseOptions::default());
//!
//!     match orchestrator.handle(Some("movies")) {
//!         Ok(Outcome::Page(view)) => println!("{} -> {}", view.current_path, view.parent_path),
//!         Ok(Outcome::Stream(target)) => println!("stream {}", target.file_name),
//!         Err(e) => eprintln!("{}", e),
//!     }
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod error;
pub mod listing;
pub mod orchestrator;
pub mod path;
pub mod view;

pub use classify::{Category, Disposition};
pub use error::{BrowseError, Result};
pub use listing::{DirectoryLister, Entry, EntryKind, DEFAULT_MAX_DEPTH};
pub use orchestrator::{
    BrowseOptions, Outcome, RequestOrchestrator, StreamTarget, DEFAULT_PREVIEW_MAX_BYTES,
    LISTING_DEPTH,
};
pub use path::{join_relative, normalize_relative, parent_of, ResolvedPath, RootBoundary, ROOT_MARKER};
pub use view::{sort_entries, FilePayload, ViewBody, ViewModel};
