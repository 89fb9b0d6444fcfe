use std::io::Read;
use std::time::Duration;

use pavao::{SmbClient, SmbCredentials, SmbDirentType, SmbOpenOptions, SmbOptions};

use crate::client::{EntryKind, ShareClient, ShareEntry, ShareError, ShareTarget};

/// [`ShareClient`] backed by libsmbclient via the `pavao` crate.
///
/// libsmbclient applies timeouts per context rather than per call, so the
/// per-transfer budget passed to [`ShareClient::store_file`] is advisory
/// here. SMB2 and later always negotiate NTLMv2 when the server offers it;
/// the target's preference flag only matters for legacy dialects this
/// backend does not speak.
pub struct SmbShareClient {
    target: ShareTarget,
    client: Option<SmbClient>,
}

impl SmbShareClient {
    pub fn new(target: ShareTarget) -> Self {
        Self {
            target,
            client: None,
        }
    }

    fn client(&self) -> Result<&SmbClient, ShareError> {
        self.client.as_ref().ok_or(ShareError::Closed)
    }
}

impl ShareClient for SmbShareClient {
    fn connect(&mut self) -> Result<(), ShareError> {
        let credentials = SmbCredentials::default()
            .server(format!("smb://{}", self.target.host))
            .share(format!("/{}", self.target.share))
            .username(&self.target.username)
            .password(&self.target.password);
        let options = SmbOptions::default()
            .no_auto_anonymous_login(true)
            .one_share_per_server(true);
        let client =
            SmbClient::new(credentials, options).map_err(|source| ShareError::Connection {
                host: self.target.host.clone(),
                source: Box::new(source),
            })?;
        self.client = Some(client);
        Ok(())
    }

    fn list_dir(&mut self, path: &str) -> Result<Vec<ShareEntry>, ShareError> {
        let entries = self
            .client()?
            .list_dir(path)
            .map_err(|source| ShareError::List {
                path: path.to_string(),
                source: Box::new(source),
            })?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let kind = match entry.get_type() {
                    SmbDirentType::File => EntryKind::File,
                    SmbDirentType::Dir => EntryKind::Directory,
                    _ => EntryKind::Special,
                };
                ShareEntry::new(entry.name(), kind)
            })
            .collect())
    }

    fn store_file(
        &mut self,
        path: &str,
        content: &mut dyn Read,
        _timeout: Duration,
    ) -> Result<u64, ShareError> {
        let store_error = |source: Box<dyn std::error::Error + Send + Sync>| ShareError::Store {
            path: path.to_string(),
            source,
        };
        let mut file = self
            .client()?
            .open_with(path, SmbOpenOptions::default().create(true).write(true))
            .map_err(|source| store_error(Box::new(source)))?;
        std::io::copy(content, &mut file).map_err(|source| store_error(Box::new(source)))
    }

    fn disconnect(&mut self) -> Result<(), ShareError> {
        // Dropping the client tears the SMB session down.
        match self.client.take() {
            Some(client) => {
                drop(client);
                Ok(())
            }
            None => Err(ShareError::Closed),
        }
    }
}
