use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use photoshelf_share::ShareTarget;
use serde::Deserialize;
use thiserror::Error;

use crate::library::MediaKind;
use crate::retention::{RetentionError, RetentionPeriod};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing required config field `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    Retention(#[from] RetentionError),
}

/// Remote connection and destination parameters. Immutable once built.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    pub connection: ShareTarget,
    pub dest_image_path: String,
    pub dest_video_path: String,
}

impl RemoteTarget {
    pub fn dest_path(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Image => &self.dest_image_path,
            MediaKind::Video => &self.dest_video_path,
        }
    }

    fn from_raw(raw: RawRemote) -> Result<Self, ConfigError> {
        let connection = ShareTarget {
            name: raw.name.ok_or(ConfigError::MissingField("remote.name"))?,
            host: raw.host.ok_or(ConfigError::MissingField("remote.host"))?,
            share: raw.share.ok_or(ConfigError::MissingField("remote.share"))?,
            username: raw
                .username
                .ok_or(ConfigError::MissingField("remote.username"))?,
            password: raw
                .password
                .ok_or(ConfigError::MissingField("remote.password"))?,
            use_ntlm_v2: raw
                .use_ntlm_v2
                .ok_or(ConfigError::MissingField("remote.use_ntlm_v2"))?,
        };
        Ok(Self {
            connection,
            dest_image_path: raw
                .dest_image_path
                .ok_or(ConfigError::MissingField("remote.dest_image_path"))?,
            dest_video_path: raw
                .dest_video_path
                .ok_or(ConfigError::MissingField("remote.dest_video_path"))?,
        })
    }
}

#[derive(Debug)]
pub struct Config {
    pub remote: RemoteTarget,
    pub retention: RetentionPeriod,
    pub library_root: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a configuration document. Pure: touches neither
    /// the network nor the library.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text)?;
        let remote = RemoteTarget::from_raw(raw.remote.ok_or(ConfigError::MissingField("remote"))?)?;
        let retention = raw
            .retention
            .ok_or(ConfigError::MissingField("retention"))?;
        let value = retention
            .value
            .ok_or(ConfigError::MissingField("retention.value"))?;
        let unit = retention
            .unit
            .ok_or(ConfigError::MissingField("retention.unit"))?;
        let retention = RetentionPeriod::new(value, &unit)?;
        let library_root = resolve_library_root(raw.library.root)?;
        Ok(Self {
            remote,
            retention,
            library_root,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    remote: Option<RawRemote>,
    retention: Option<RawRetention>,
    #[serde(default)]
    library: RawLibrary,
}

#[derive(Debug, Deserialize)]
struct RawRemote {
    name: Option<String>,
    host: Option<String>,
    share: Option<String>,
    dest_image_path: Option<String>,
    dest_video_path: Option<String>,
    username: Option<String>,
    password: Option<String>,
    use_ntlm_v2: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLibrary {
    root: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRetention {
    value: Option<u32>,
    unit: Option<String>,
}

fn resolve_library_root(configured: Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(value) = configured {
        let home = dirs::home_dir();
        return Ok(expand_with_home(&value, home.as_deref()));
    }
    dirs::picture_dir().ok_or(ConfigError::MissingField("library.root"))
}

fn expand_with_home(value: &str, home: Option<&Path>) -> PathBuf {
    if let Some(home) = home {
        if value == "~" {
            return home.to_path_buf();
        }
        if let Some(rest) = value.strip_prefix("~/") {
            return home.join(rest);
        }
    }
    PathBuf::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retention::RetentionUnit;

    const FULL: &str = r#"{
        "remote": {
            "name": "nas",
            "host": "192.168.1.20",
            "share": "media",
            "dest_image_path": "/photos",
            "dest_video_path": "/videos",
            "username": "sync",
            "password": "secret",
            "use_ntlm_v2": true
        },
        "retention": { "value": 30, "unit": "day" },
        "library": { "root": "/srv/pictures" }
    }"#;

    #[test]
    fn parses_a_complete_document() {
        let config = Config::from_json(FULL).unwrap();
        assert_eq!(config.remote.connection.name, "nas");
        assert_eq!(config.remote.connection.host, "192.168.1.20");
        assert_eq!(config.remote.dest_path(MediaKind::Image), "/photos");
        assert_eq!(config.remote.dest_path(MediaKind::Video), "/videos");
        assert!(config.remote.connection.use_ntlm_v2);
        assert_eq!(config.retention.value(), 30);
        assert_eq!(config.retention.unit(), RetentionUnit::Day);
        assert_eq!(config.library_root, PathBuf::from("/srv/pictures"));
    }

    #[test]
    fn missing_remote_field_is_named() {
        let text = FULL.replace(r#""password": "secret","#, "");
        let err = Config::from_json(&text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("remote.password")));
    }

    #[test]
    fn missing_retention_group_is_rejected() {
        let text = FULL.replace(r#""retention": { "value": 30, "unit": "day" },"#, "");
        let err = Config::from_json(&text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("retention")));
    }

    #[test]
    fn bad_retention_unit_is_rejected() {
        let text = FULL.replace(r#""unit": "day""#, r#""unit": "fortnight""#);
        let err = Config::from_json(&text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Retention(RetentionError::InvalidUnit(_))
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = Config::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn expands_tilde_against_home() {
        let home = Path::new("/home/sync");
        assert_eq!(
            expand_with_home("~/Pictures", Some(home)),
            PathBuf::from("/home/sync/Pictures")
        );
        assert_eq!(expand_with_home("~", Some(home)), PathBuf::from("/home/sync"));
        assert_eq!(
            expand_with_home("/absolute", Some(home)),
            PathBuf::from("/absolute")
        );
        assert_eq!(expand_with_home("~/x", None), PathBuf::from("~/x"));
    }
}
