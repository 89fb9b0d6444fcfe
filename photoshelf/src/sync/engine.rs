use std::collections::HashSet;
use std::io;

use photoshelf_share::{ShareClient, ShareError, join_path};
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::RemoteTarget;
use crate::library::{LibraryError, MediaAsset, MediaKind, MediaLibrary};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("share error: {0}")]
    Share(#[from] ShareError),
    #[error("library error: {0}")]
    Library(#[from] LibraryError),
    #[error("reading {name}: {source}")]
    AssetRead { name: String, source: io::Error },
}

/// Reconciles local assets of one media kind against the remote
/// destination and collects deletion candidates along the way.
///
/// "Already synced" means "an entry with the same name exists remotely";
/// no size, hash, or timestamp comparison is attempted.
pub struct SyncEngine<'a, S: ShareClient, L: MediaLibrary> {
    share: &'a mut S,
    library: &'a L,
    target: &'a RemoteTarget,
    cutoff: OffsetDateTime,
    pending_delete: &'a mut Vec<L::Asset>,
}

impl<'a, S: ShareClient, L: MediaLibrary> SyncEngine<'a, S, L> {
    pub fn new(
        share: &'a mut S,
        library: &'a L,
        target: &'a RemoteTarget,
        cutoff: OffsetDateTime,
        pending_delete: &'a mut Vec<L::Asset>,
    ) -> Self {
        Self {
            share,
            library,
            target,
            cutoff,
            pending_delete,
        }
    }

    /// Upload assets of `kind` that are missing remotely and queue old
    /// deletable assets for the end-of-run batch delete. Returns the
    /// number of files copied.
    ///
    /// The destination is re-listed on every call; nothing is cached
    /// across calls or runs.
    pub fn sync(&mut self, kind: MediaKind) -> Result<usize, SyncError> {
        let dest = self.target.dest_path(kind);
        let remote_names: HashSet<String> = self
            .share
            .list_dir(dest)?
            .into_iter()
            .filter(|entry| entry.is_normal())
            .map(|entry| entry.name)
            .collect();

        let mut copied = 0;
        for asset in self.library.assets(kind)? {
            let name = asset.file_name().to_owned();
            if !remote_names.contains(&name) {
                let mut content = asset.open().map_err(|source| SyncError::AssetRead {
                    name: name.clone(),
                    source,
                })?;
                self.share
                    .store_file(&join_path(dest, &name), &mut *content, kind.transfer_timeout())?;
                copied += 1;
            }
            // Deletion eligibility is independent of whether the asset was
            // just uploaded or already present remotely.
            if asset.is_deletable() && asset.created_at() < self.cutoff {
                self.pending_delete.push(asset);
            }
        }
        Ok(copied)
    }
}
