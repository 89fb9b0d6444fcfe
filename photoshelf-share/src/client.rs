use std::fmt;
use std::io::Read;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("connection to {host} failed: {source}")]
    Connection {
        host: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("listing {path} failed: {source}")]
    List {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("storing {path} failed: {source}")]
    Store {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("share connection is closed")]
    Closed,
}

/// Connection parameters for one remote share.
#[derive(Clone)]
pub struct ShareTarget {
    /// Display name of the remote host, used for reporting.
    pub name: String,
    pub host: String,
    pub share: String,
    pub username: String,
    pub password: String,
    /// Prefer NTLMv2 during session setup. Only meaningful to backends
    /// that still negotiate legacy dialects.
    pub use_ntlm_v2: bool,
}

impl fmt::Debug for ShareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareTarget")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("share", &self.share)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("use_ntlm_v2", &self.use_ntlm_v2)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Printer queues, IPC endpoints and other non-file server objects.
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl ShareEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// A normal entry is a plain file, not a directory or a special
    /// server-side object.
    pub fn is_normal(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// One live connection to a remote share.
///
/// Implementations are constructed unconnected; [`ShareClient::connect`]
/// establishes the session and [`ShareClient::disconnect`] tears it down.
pub trait ShareClient {
    fn connect(&mut self) -> Result<(), ShareError>;

    /// List the entries at `path`, relative to the share root.
    fn list_dir(&mut self, path: &str) -> Result<Vec<ShareEntry>, ShareError>;

    /// Store `content` at `path`, creating or replacing the remote file.
    /// `timeout` is the per-transfer budget, honored where the backend
    /// supports one. Returns the number of bytes written.
    fn store_file(
        &mut self,
        path: &str,
        content: &mut dyn Read,
        timeout: Duration,
    ) -> Result<u64, ShareError>;

    fn disconnect(&mut self) -> Result<(), ShareError>;
}

/// Join a directory path and an entry name with the share separator.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_plain_files_are_normal() {
        assert!(ShareEntry::new("a.jpg", EntryKind::File).is_normal());
        assert!(!ShareEntry::new("photos", EntryKind::Directory).is_normal());
        assert!(!ShareEntry::new("lp0", EntryKind::Special).is_normal());
    }

    #[test]
    fn joins_paths_with_single_separator() {
        assert_eq!(join_path("/photos", "a.jpg"), "/photos/a.jpg");
        assert_eq!(join_path("/photos/", "a.jpg"), "/photos/a.jpg");
        assert_eq!(join_path("/", "a.jpg"), "/a.jpg");
        assert_eq!(join_path("", "a.jpg"), "/a.jpg");
    }

    #[test]
    fn debug_redacts_password() {
        let target = ShareTarget {
            name: "nas".into(),
            host: "192.168.1.20".into(),
            share: "media".into(),
            username: "sync".into(),
            password: "hunter2".into(),
            use_ntlm_v2: true,
        };
        let rendered = format!("{target:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }
}
