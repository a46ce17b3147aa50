//! Dataset configuration: storage kind, codec and on-disk naming.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::error::{Error, Result};

/// Which storage backend holds the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Full dataset resident in memory, with a snapshot file for startup caching.
    Memory,
    /// Embedded key-value store on disk, records decoded per query.
    Persistent,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "persistent" => Ok(StorageKind::Persistent),
            _ => Err(Error::Config(format!(
                "unknown storage kind: {s}. Expected 'memory' or 'persistent'"
            ))),
        }
    }
}

/// Immutable configuration for one loaded dataset handle.
///
/// `dataset` is a path stem; the full file name appends the codec, an optional
/// `.gz` marker and a kind suffix, so distinct `(dataset, codec, compress)`
/// configurations never read each other's data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub kind: StorageKind,
    pub dataset: PathBuf,
    pub codec: Codec,
    pub compress: bool,
}

impl Config {
    pub fn new(kind: StorageKind, dataset: impl Into<PathBuf>) -> Self {
        Self { kind, dataset: dataset.into(), codec: Codec::Record, compress: false }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Path of the memory backend's snapshot cache.
    pub fn snapshot_path(&self) -> PathBuf {
        self.suffixed("snap")
    }

    /// Path of the persistent backend's key-value store.
    pub fn db_path(&self) -> PathBuf {
        self.suffixed("db")
    }

    /// Path of whichever file the configured backend uses.
    pub fn data_path(&self) -> PathBuf {
        match self.kind {
            StorageKind::Memory => self.snapshot_path(),
            StorageKind::Persistent => self.db_path(),
        }
    }

    fn suffixed(&self, kind: &str) -> PathBuf {
        let stem = self.dataset.as_os_str().to_string_lossy();
        let gz = if self.compress { ".gz" } else { "" };
        PathBuf::from(format!("{stem}.{codec}{gz}.{kind}", codec = self.codec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_unique_per_configuration() {
        let base = Config::new(StorageKind::Memory, "world");
        let mut seen = std::collections::HashSet::new();
        for codec in [Codec::Json, Codec::Bincode, Codec::Record] {
            for compress in [false, true] {
                let config = base.clone().with_codec(codec).with_compression(compress);
                assert!(seen.insert(config.snapshot_path()));
                assert!(seen.insert(config.db_path()));
            }
        }
    }

    #[test]
    fn suffix_reflects_codec_and_compression() {
        let config = Config::new(StorageKind::Persistent, "data/world")
            .with_codec(Codec::Bincode)
            .with_compression(true);
        assert_eq!(config.data_path(), PathBuf::from("data/world.bincode.gz.db"));
    }

    #[test]
    fn unknown_names_fail_with_config_error() {
        assert!(matches!("boltdb".parse::<StorageKind>(), Err(Error::Config(_))));
        assert!("PERSISTENT".parse::<StorageKind>().is_ok());
    }
}
