use std::time::{Duration, Instant};

use photoshelf_share::{ShareClient, ShareError};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::RemoteTarget;
use crate::library::{LibraryError, MediaKind, MediaLibrary};
use crate::retention::RetentionPeriod;
use crate::sync::engine::SyncEngine;
pub use crate::sync::engine::SyncError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("connection error: {0}")]
    Connection(#[source] ShareError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("batch delete failed: {0}")]
    Delete(#[source] LibraryError),
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub images_copied: usize,
    pub videos_copied: usize,
    pub deleted: usize,
    pub elapsed: Duration,
}

/// Sequences one offload run: connect, sync images then videos, then a
/// cleanup that always executes (close the connection, then batch-delete
/// whatever the sync passes queued). Cleanup failures never mask an
/// in-flight sync error.
pub struct Runner<'a, S: ShareClient, L: MediaLibrary> {
    share: &'a mut S,
    library: &'a mut L,
    target: RemoteTarget,
    retention: RetentionPeriod,
}

impl<'a, S: ShareClient, L: MediaLibrary> Runner<'a, S, L> {
    pub fn new(
        share: &'a mut S,
        library: &'a mut L,
        target: RemoteTarget,
        retention: RetentionPeriod,
    ) -> Self {
        Self {
            share,
            library,
            target,
            retention,
        }
    }

    pub fn run(self) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let cutoff = self.retention.cutoff_from(OffsetDateTime::now_utc());
        let mut pending: Vec<L::Asset> = Vec::new();

        let primary = sync_all(
            &mut *self.share,
            &*self.library,
            &self.target,
            cutoff,
            &mut pending,
        );

        // Cleanup runs whether the sync phases succeeded or not; deletions
        // queued before a failure are still honored.
        let closed = self.share.disconnect();
        if let Err(err) = &closed {
            eprintln!("[photoshelf] warning: failed to close share connection: {err}");
        }
        let deleted = if pending.is_empty() {
            Ok(0)
        } else {
            eprintln!(
                "[photoshelf] deleting {} assets older than {} from the library...",
                pending.len(),
                self.retention
            );
            self.library.delete_batch(pending).map_err(RunError::Delete)
        };

        let elapsed = started.elapsed();
        eprintln!("[photoshelf] done (elapsed time: {elapsed:?})");

        let (images_copied, videos_copied) = primary?;
        let deleted = deleted?;
        closed.map_err(RunError::Connection)?;
        Ok(RunSummary {
            images_copied,
            videos_copied,
            deleted,
            elapsed,
        })
    }
}

fn sync_all<S: ShareClient, L: MediaLibrary>(
    share: &mut S,
    library: &L,
    target: &RemoteTarget,
    cutoff: OffsetDateTime,
    pending: &mut Vec<L::Asset>,
) -> Result<(usize, usize), RunError> {
    eprintln!(
        "[photoshelf] connecting to {} ({})",
        target.connection.name, target.connection.host
    );
    share.connect().map_err(RunError::Connection)?;
    eprintln!(
        "[photoshelf] deletion cutoff: {}",
        cutoff
            .format(&Rfc3339)
            .unwrap_or_else(|_| cutoff.to_string())
    );

    let mut engine = SyncEngine::new(share, library, target, cutoff, pending);
    let images = sync_kind(&mut engine, target, MediaKind::Image)?;
    let videos = sync_kind(&mut engine, target, MediaKind::Video)?;
    Ok((images, videos))
}

fn sync_kind<S: ShareClient, L: MediaLibrary>(
    engine: &mut SyncEngine<'_, S, L>,
    target: &RemoteTarget,
    kind: MediaKind,
) -> Result<usize, RunError> {
    eprintln!(
        "[photoshelf] moving {} files to {}...",
        kind.label(),
        target.dest_path(kind)
    );
    let copied = engine.sync(kind)?;
    eprintln!("[photoshelf] {}s copied: {copied}", kind.label());
    Ok(copied)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
