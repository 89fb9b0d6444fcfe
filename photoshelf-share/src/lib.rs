mod client;
#[cfg(feature = "smb")]
mod smb;

pub use client::{EntryKind, ShareClient, ShareEntry, ShareError, ShareTarget, join_path};
#[cfg(feature = "smb")]
pub use smb::SmbShareClient;
