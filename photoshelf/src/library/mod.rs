use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use time::OffsetDateTime;

pub mod fs;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "heic", "heif", "webp", "dng",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "avi", "mkv", "webm", "3gp", "mts"];

// Per-transfer budgets handed to the share client, in whole seconds.
const IMAGE_TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);
const VIDEO_TRANSFER_TIMEOUT: Duration = Duration::from_secs(2048);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a file by extension; `None` for anything that is neither
    /// an image nor a video.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }

    pub fn transfer_timeout(self) -> Duration {
        match self {
            Self::Image => IMAGE_TRANSFER_TIMEOUT,
            Self::Video => VIDEO_TRANSFER_TIMEOUT,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to scan library at {path}: {source}")]
    Scan { path: PathBuf, source: io::Error },
    #[error("failed to delete {path}: {source}")]
    Delete { path: PathBuf, source: io::Error },
}

/// One asset tracked by the local library.
///
/// `file_name` is the base name as the OS tracks it, which is the name
/// used for remote diffing. `open` yields the original file bytes, never
/// a re-encoded representation.
pub trait MediaAsset {
    fn file_name(&self) -> &str;
    fn created_at(&self) -> OffsetDateTime;
    /// Whether the library permits deleting this asset.
    fn is_deletable(&self) -> bool;
    fn open(&self) -> io::Result<Box<dyn Read>>;
}

/// Access to the local photo library.
pub trait MediaLibrary {
    type Asset: MediaAsset;

    /// Enumerate assets of one kind, in whatever order the backing store
    /// yields them.
    fn assets(&self, kind: MediaKind) -> Result<Vec<Self::Asset>, LibraryError>;

    /// Delete the given assets in one batch. Returns the number deleted.
    fn delete_batch(&mut self, assets: Vec<Self::Asset>) -> Result<usize, LibraryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_lowercased_extension() {
        assert_eq!(MediaKind::from_path(Path::new("a.jpg")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("b.HEIC")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("c.MOV")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("d.mp4")), Some(MediaKind::Video));
    }

    #[test]
    fn unknown_or_missing_extension_is_unclassified() {
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn per_kind_transfer_timeouts() {
        assert_eq!(MediaKind::Image.transfer_timeout(), Duration::from_secs(30));
        assert_eq!(MediaKind::Video.transfer_timeout(), Duration::from_secs(2048));
    }
}
