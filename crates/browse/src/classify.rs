//! Content classification by file name extension.

use serde::Serialize;

/// Content-handling category of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Streamed inline as an image.
    Image,
    /// Streamed inline as a video.
    Video,
    /// Streamed as an attachment download.
    Archive,
    /// Read and displayed as text, best effort.
    PlainText,
}

/// How streamed bytes should be presented by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Inline,
    Attachment,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip"];

impl Category {
    /// Classify a file name by its lowercased extension.
    ///
    /// The extension is everything after the last `.` of the name, so a bare
    /// `.png` counts as an image. Anything unrecognised is [`Category::PlainText`].
    pub fn classify(name: &str) -> Self {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return Category::PlainText;
        };
        let ext = ext.to_lowercase();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Category::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Category::Video
        } else if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) {
            Category::Archive
        } else {
            Category::PlainText
        }
    }

    /// Streaming disposition, or `None` for categories rendered as text.
    pub fn disposition(&self) -> Option<Disposition> {
        match self {
            Category::Image | Category::Video => Some(Disposition::Inline),
            Category::Archive => Some(Disposition::Attachment),
            Category::PlainText => None,
        }
    }

    /// Explicit content type, when the category mandates one.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Category::Archive => Some("application/zip"),
            _ => None,
        }
    }
}
