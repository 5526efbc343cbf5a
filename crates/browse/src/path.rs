//! Root-confined path resolution.
//!
//! Client paths are slash-separated and logically rooted at a [`RootBoundary`].
//! Resolution is purely lexical: `.` and `..` segments and repeated separators
//! are collapsed without touching the filesystem, and the result must stay a
//! descendant of (or equal to) the root. Symlink escapes are handled separately
//! by [`RootBoundary::confine_real`].

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{BrowseError, Result};

/// Relative path denoting the root itself.
pub const ROOT_MARKER: &str = ".";

/// The single absolute directory all browsing is confined to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootBoundary {
    /// Absolute, lexically normalized root.
    path: PathBuf,
    /// Symlink-resolved form of the root, used for real-path checks.
    canonical: PathBuf,
}

impl RootBoundary {
    /// Establish the root boundary from an on-disk directory.
    ///
    /// The path is canonicalized once; a missing root or a root that is not a
    /// directory is an error.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let canonical = fs::canonicalize(path.as_ref())?;
        if !canonical.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("root is not a directory: {}", canonical.display()),
            ));
        }

        Ok(Self {
            path: canonical.clone(),
            canonical,
        })
    }

    /// Build a boundary without consulting the filesystem.
    ///
    /// Relative paths are made absolute against the current directory.
    pub fn lexical(path: impl AsRef<Path>) -> io::Result<Self> {
        let absolute = std::path::absolute(path.as_ref())?;
        let normalized = normalize_lexically(&absolute);
        Ok(Self {
            path: normalized.clone(),
            canonical: normalized,
        })
    }

    /// The absolute root path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a client-relative path against the root.
    ///
    /// Returns [`BrowseError::PermissionDenied`] when the normalized candidate
    /// does not lie under the root. Leading separators do not make the input
    /// absolute; `"/etc"` means `<root>/etc`.
    pub fn resolve(&self, relative: &str) -> Result<ResolvedPath> {
        let mut joined = self.path.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            joined.push(segment);
        }

        let candidate = normalize_lexically(&joined);

        // Component-wise, so `/data` never matches `/database`.
        let Ok(suffix) = candidate.strip_prefix(&self.path) else {
            return Err(BrowseError::PermissionDenied);
        };

        let relative = suffix
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        Ok(ResolvedPath {
            relative: if relative.is_empty() {
                ROOT_MARKER.to_string()
            } else {
                relative
            },
            absolute: candidate,
        })
    }

    /// Check that a resolved path still lies under the root once symlinks
    /// are followed.
    ///
    /// The path must exist. Escapes are reported as
    /// [`BrowseError::PermissionDenied`].
    pub fn confine_real(&self, resolved: &ResolvedPath) -> Result<PathBuf> {
        let real = fs::canonicalize(&resolved.absolute).map_err(BrowseError::from_stat)?;
        if real.starts_with(&self.canonical) {
            Ok(real)
        } else {
            Err(BrowseError::PermissionDenied)
        }
    }
}

/// An absolute path guaranteed to lie within a [`RootBoundary`].
///
/// Only produced by [`RootBoundary::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: String,
}

impl ResolvedPath {
    /// Absolute filesystem path.
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Normalized root-relative form, `"."` for the root itself.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Whether this path denotes the root itself.
    pub fn is_root(&self) -> bool {
        self.relative == ROOT_MARKER
    }

    /// Final path component, if any.
    pub fn file_name(&self) -> Option<String> {
        self.absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Compute the relative path one level up, clamped at the root.
///
/// Operates purely lexically and only ever removes segments, so the result is
/// always accepted by [`RootBoundary::resolve`].
pub fn parent_of(relative: &str) -> String {
    let mut segments = clean_segments(relative);
    segments.pop();
    join_segments(&segments)
}

/// Normalize a client-relative path, clamping `..` at the root.
pub fn normalize_relative(relative: &str) -> String {
    join_segments(&clean_segments(relative))
}

/// Append a child name to a normalized relative path.
pub fn join_relative(parent: &str, name: &str) -> String {
    let parent = normalize_relative(parent);
    if parent == ROOT_MARKER {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

fn clean_segments(relative: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments
}

fn join_segments(segments: &[&str]) -> String {
    if segments.is_empty() {
        ROOT_MARKER.to_string()
    } else {
        segments.join("/")
    }
}

/// Collapse `.`, `..` and repeated separators without touching the filesystem.
///
/// `..` at the filesystem root stays at the root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn data_root() -> RootBoundary {
        RootBoundary::lexical("/srv/data").unwrap()
    }

    #[test]
    fn test_resolve_empty_and_dot_denote_root() {
        let root = data_root();

        for input in ["", ".", "./", "//", "./."] {
            let resolved = root.resolve(input).unwrap();
            assert_eq!(resolved.absolute(), Path::new("/srv/data"), "input {:?}", input);
            assert_eq!(resolved.relative(), ROOT_MARKER);
            assert!(resolved.is_root());
        }
    }

    #[test]
    fn test_resolve_nested() {
        let root = data_root();
        let resolved = root.resolve("movies//2024/./clip.mp4").unwrap();

        assert_eq!(
            resolved.absolute(),
            Path::new("/srv/data/movies/2024/clip.mp4")
        );
        assert_eq!(resolved.relative(), "movies/2024/clip.mp4");
        assert_eq!(resolved.file_name().as_deref(), Some("clip.mp4"));
    }

    #[test]
    fn test_resolve_parent_within_root() {
        let root = data_root();
        let resolved = root.resolve("a/b/../c").unwrap();
        assert_eq!(resolved.relative(), "a/c");

        let resolved = root.resolve("a/..").unwrap();
        assert!(resolved.is_root());
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let root = data_root();

        for input in ["..", "../", "../../etc/passwd", "a/../../b", "./../other/x"] {
            let result = root.resolve(input);
            assert!(
                matches!(result, Err(BrowseError::PermissionDenied)),
                "input {:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_resolve_rejects_sibling_with_shared_prefix() {
        let root = RootBoundary::lexical("/data").unwrap();
        let result = root.resolve("../database/secret");
        assert!(matches!(result, Err(BrowseError::PermissionDenied)));
    }

    #[test]
    fn test_resolve_leading_slash_stays_rooted() {
        let root = data_root();
        let resolved = root.resolve("/etc/passwd").unwrap();
        assert_eq!(resolved.absolute(), Path::new("/srv/data/etc/passwd"));
    }

    #[test]
    fn test_resolve_never_escapes() {
        let root = data_root();
        let segments = ["..", ".", "a", "b", "", "data", "srv"];

        // Every three-segment combination either stays inside or is rejected.
        for x in segments {
            for y in segments {
                for z in segments {
                    let input = format!("{}/{}/{}", x, y, z);
                    match root.resolve(&input) {
                        Ok(resolved) => assert!(
                            resolved.absolute().starts_with(root.path()),
                            "{:?} escaped to {:?}",
                            input,
                            resolved.absolute()
                        ),
                        Err(e) => assert!(e.is_permission_denied()),
                    }
                }
            }
        }
    }

    #[test]
    fn test_resolve_at_filesystem_root() {
        let root = RootBoundary::lexical("/").unwrap();
        let resolved = root.resolve("../etc").unwrap();
        assert_eq!(resolved.absolute(), Path::new("/etc"));
    }

    #[test]
    fn test_parent_of_root_is_idempotent() {
        assert_eq!(parent_of("."), ".");
        assert_eq!(parent_of(""), ".");
        assert_eq!(parent_of("./"), ".");
        assert_eq!(parent_of(".."), ".");
    }

    #[test]
    fn test_parent_of_nested() {
        assert_eq!(parent_of("a"), ".");
        assert_eq!(parent_of("a/b"), "a");
        assert_eq!(parent_of("a/b/"), "a");
        assert_eq!(parent_of("a//b/./c"), "a/b");
        assert_eq!(parent_of("a/b/../c"), "a");
    }

    #[test]
    fn test_parent_of_is_always_resolvable() {
        let root = data_root();
        for input in ["../x", "../../a/b", "a/../../..", "x/y/z", "."] {
            let parent = parent_of(input);
            assert!(root.resolve(&parent).is_ok(), "parent of {:?} = {:?}", input, parent);
        }
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative(".", "a"), "a");
        assert_eq!(join_relative("", "a"), "a");
        assert_eq!(join_relative("x/y", "a"), "x/y/a");
        assert_eq!(join_relative("x/./y/", "a"), "x/y/a");
    }

    #[test]
    fn test_new_requires_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(RootBoundary::new(temp_dir.path()).is_ok());
        assert!(RootBoundary::new(temp_dir.path().join("missing")).is_err());
        assert!(RootBoundary::new(&file).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_confine_real_rejects_symlink_escape() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let other_dir = TempDir::new().unwrap();
        fs::write(other_dir.path().join("secret.txt"), "Secret").unwrap();
        fs::write(temp_dir.path().join("inside.txt"), "Inside").unwrap();
        symlink(other_dir.path().join("secret.txt"), temp_dir.path().join("sneaky")).unwrap();
        symlink(temp_dir.path().join("inside.txt"), temp_dir.path().join("friendly")).unwrap();

        let root = RootBoundary::new(temp_dir.path()).unwrap();

        // Lexically confined, but the link points outside.
        let sneaky = root.resolve("sneaky").unwrap();
        assert!(matches!(
            root.confine_real(&sneaky),
            Err(BrowseError::PermissionDenied)
        ));

        let friendly = root.resolve("friendly").unwrap();
        assert!(root.confine_real(&friendly).is_ok());
    }

    #[test]
    fn test_confine_real_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = RootBoundary::new(temp_dir.path()).unwrap();
        let missing = root.resolve("nope").unwrap();
        assert!(matches!(
            root.confine_real(&missing),
            Err(BrowseError::NotFound)
        ));
    }
}
