//! Hand-rolled fakes for the share and library seams, shared by the
//! engine and runner tests.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::time::Duration;

use photoshelf_share::{EntryKind, ShareClient, ShareEntry, ShareError, ShareTarget};
use time::OffsetDateTime;

use crate::config::RemoteTarget;
use crate::library::{LibraryError, MediaAsset, MediaKind, MediaLibrary};

pub fn target() -> RemoteTarget {
    RemoteTarget {
        connection: ShareTarget {
            name: "nas".into(),
            host: "192.168.1.20".into(),
            share: "media".into(),
            username: "sync".into(),
            password: "secret".into(),
            use_ntlm_v2: true,
        },
        dest_image_path: "/photos".into(),
        dest_video_path: "/videos".into(),
    }
}

pub fn days_ago(days: i64) -> OffsetDateTime {
    OffsetDateTime::now_utc() - time::Duration::days(days)
}

#[derive(Debug, Clone)]
pub struct MockAsset {
    pub name: String,
    pub created_at: OffsetDateTime,
    pub deletable: bool,
    pub bytes: Vec<u8>,
}

impl MockAsset {
    pub fn new(name: &str, created_at: OffsetDateTime, deletable: bool) -> Self {
        Self {
            name: name.to_string(),
            created_at,
            deletable,
            bytes: b"data".to_vec(),
        }
    }

    pub fn with_bytes(mut self, bytes: &[u8]) -> Self {
        self.bytes = bytes.to_vec();
        self
    }
}

impl MediaAsset for MockAsset {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn is_deletable(&self) -> bool {
        self.deletable
    }

    fn open(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }
}

#[derive(Default)]
pub struct MockLibrary {
    assets: HashMap<MediaKind, Vec<MockAsset>>,
    pub deleted: Vec<String>,
    pub delete_calls: usize,
    pub fail_delete: bool,
}

impl MockLibrary {
    pub fn with_assets(kind: MediaKind, assets: Vec<MockAsset>) -> Self {
        let mut library = Self::default();
        for asset in assets {
            library.insert(kind, asset);
        }
        library
    }

    pub fn insert(&mut self, kind: MediaKind, asset: MockAsset) {
        self.assets.entry(kind).or_default().push(asset);
    }
}

impl MediaLibrary for MockLibrary {
    type Asset = MockAsset;

    fn assets(&self, kind: MediaKind) -> Result<Vec<MockAsset>, LibraryError> {
        Ok(self.assets.get(&kind).cloned().unwrap_or_default())
    }

    fn delete_batch(&mut self, assets: Vec<MockAsset>) -> Result<usize, LibraryError> {
        self.delete_calls += 1;
        if self.fail_delete {
            return Err(LibraryError::Delete {
                path: "mock".into(),
                source: io::Error::other("delete refused"),
            });
        }
        self.deleted
            .extend(assets.iter().map(|asset| asset.name.clone()));
        Ok(assets.len())
    }
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: String,
    pub bytes: Vec<u8>,
    pub timeout: Duration,
}

#[derive(Default)]
pub struct MockShare {
    pub listings: HashMap<String, Vec<ShareEntry>>,
    pub stored: Vec<StoredFile>,
    pub connects: usize,
    pub disconnects: usize,
    pub fail_connect: bool,
    pub fail_list_for: Option<String>,
    pub fail_store: bool,
    pub fail_disconnect: bool,
}

impl MockShare {
    pub fn with_listing(path: &str, names: &[&str]) -> Self {
        let mut share = Self::default();
        share.set_listing(path, names);
        share
    }

    pub fn set_listing(&mut self, path: &str, names: &[&str]) {
        self.listings.insert(
            path.to_string(),
            names
                .iter()
                .map(|name| ShareEntry::new(*name, EntryKind::File))
                .collect(),
        );
    }

    pub fn stored_paths(&self) -> Vec<&str> {
        self.stored.iter().map(|file| file.path.as_str()).collect()
    }
}

impl ShareClient for MockShare {
    fn connect(&mut self) -> Result<(), ShareError> {
        if self.fail_connect {
            return Err(ShareError::Connection {
                host: "mock".into(),
                source: Box::new(io::Error::other("connection refused")),
            });
        }
        self.connects += 1;
        Ok(())
    }

    fn list_dir(&mut self, path: &str) -> Result<Vec<ShareEntry>, ShareError> {
        if self.fail_list_for.as_deref() == Some(path) {
            return Err(ShareError::List {
                path: path.to_string(),
                source: Box::new(io::Error::other("listing refused")),
            });
        }
        Ok(self.listings.get(path).cloned().unwrap_or_default())
    }

    fn store_file(
        &mut self,
        path: &str,
        content: &mut dyn Read,
        timeout: Duration,
    ) -> Result<u64, ShareError> {
        if self.fail_store {
            return Err(ShareError::Store {
                path: path.to_string(),
                source: Box::new(io::Error::other("store refused")),
            });
        }
        let mut bytes = Vec::new();
        content
            .read_to_end(&mut bytes)
            .map_err(|source| ShareError::Store {
                path: path.to_string(),
                source: Box::new(source),
            })?;
        let written = bytes.len() as u64;
        self.stored.push(StoredFile {
            path: path.to_string(),
            bytes,
            timeout,
        });
        Ok(written)
    }

    fn disconnect(&mut self) -> Result<(), ShareError> {
        self.disconnects += 1;
        if self.fail_disconnect {
            return Err(ShareError::Closed);
        }
        Ok(())
    }
}
