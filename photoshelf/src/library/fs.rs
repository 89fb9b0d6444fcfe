use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use walkdir::WalkDir;

use super::{LibraryError, MediaAsset, MediaKind, MediaLibrary};

/// Photo library backed by a directory tree.
///
/// Media kind comes from the file extension, the creation timestamp from
/// filesystem metadata (modification time where the platform records no
/// birth time), and deletability from the read-only permission bit.
pub struct FsLibrary {
    root: PathBuf,
}

impl FsLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MediaLibrary for FsLibrary {
    type Asset = FsAsset;

    fn assets(&self, kind: MediaKind) -> Result<Vec<FsAsset>, LibraryError> {
        let scan_error = |path: &Path, source: io::Error| LibraryError::Scan {
            path: path.to_path_buf(),
            source,
        };
        let mut assets = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|source| scan_error(&self.root, source.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if is_hidden(path) {
                continue;
            }
            if MediaKind::from_path(path) != Some(kind) {
                continue;
            }
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let metadata = entry
                .metadata()
                .map_err(|source| scan_error(path, source.into()))?;
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map_err(|source| scan_error(path, source))?;
            assets.push(FsAsset {
                path: path.to_path_buf(),
                file_name: file_name.to_string_lossy().into_owned(),
                created_at: OffsetDateTime::from(created),
                deletable: !metadata.permissions().readonly(),
            });
        }
        Ok(assets)
    }

    fn delete_batch(&mut self, assets: Vec<FsAsset>) -> Result<usize, LibraryError> {
        let count = assets.len();
        for asset in &assets {
            fs::remove_file(&asset.path).map_err(|source| LibraryError::Delete {
                path: asset.path.clone(),
                source,
            })?;
        }
        Ok(count)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct FsAsset {
    path: PathBuf,
    file_name: String,
    created_at: OffsetDateTime,
    deletable: bool,
}

impl MediaAsset for FsAsset {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn is_deletable(&self) -> bool {
        self.deletable
    }

    fn open(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn enumerates_only_the_requested_kind() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"jpeg").unwrap();
        fs::write(dir.path().join("b.mov"), b"quicktime").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.png"), b"png").unwrap();

        let library = FsLibrary::new(dir.path());
        let mut images: Vec<String> = library
            .assets(MediaKind::Image)
            .unwrap()
            .into_iter()
            .map(|asset| asset.file_name().to_string())
            .collect();
        images.sort();
        assert_eq!(images, ["a.jpg", "c.png"]);

        let videos = library.assets(MediaKind::Video).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].file_name(), "b.mov");
    }

    #[test]
    fn hidden_files_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".trashed.jpg"), b"jpeg").unwrap();
        fs::write(dir.path().join("kept.jpg"), b"jpeg").unwrap();

        let library = FsLibrary::new(dir.path());
        let images = library.assets(MediaKind::Image).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].file_name(), "kept.jpg");
    }

    #[test]
    fn read_only_assets_are_not_deletable() {
        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked.jpg");
        fs::write(&locked, b"jpeg").unwrap();
        let mut perms = fs::metadata(&locked).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&locked, perms).unwrap();
        fs::write(dir.path().join("free.jpg"), b"jpeg").unwrap();

        let library = FsLibrary::new(dir.path());
        for asset in library.assets(MediaKind::Image).unwrap() {
            match asset.file_name() {
                "locked.jpg" => assert!(!asset.is_deletable()),
                "free.jpg" => assert!(asset.is_deletable()),
                other => panic!("unexpected asset {other}"),
            }
        }
    }

    #[test]
    fn open_yields_the_original_bytes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"original payload").unwrap();

        let library = FsLibrary::new(dir.path());
        let assets = library.assets(MediaKind::Image).unwrap();
        let mut content = Vec::new();
        assets[0].open().unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"original payload");
    }

    #[test]
    fn delete_batch_removes_files_and_reports_count() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"jpeg").unwrap();
        fs::write(dir.path().join("b.jpg"), b"jpeg").unwrap();

        let mut library = FsLibrary::new(dir.path());
        let assets = library.assets(MediaKind::Image).unwrap();
        assert_eq!(library.delete_batch(assets).unwrap(), 2);
        assert!(!dir.path().join("a.jpg").exists());
        assert!(!dir.path().join("b.jpg").exists());
    }

    #[test]
    fn delete_batch_surfaces_missing_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"jpeg").unwrap();

        let mut library = FsLibrary::new(dir.path());
        let assets = library.assets(MediaKind::Image).unwrap();
        fs::remove_file(dir.path().join("a.jpg")).unwrap();

        let err = library.delete_batch(assets).unwrap_err();
        assert!(matches!(err, LibraryError::Delete { .. }));
    }
}
