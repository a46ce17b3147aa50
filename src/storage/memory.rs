//! Resident in-memory backend with a snapshot cache.
//!
//! The snapshot file avoids re-decoding the raw boundary source on every
//! startup. Layout:
//!
//! ```text
//! "GTZS" | u8 version | u32 record_count | u8 compressed |
//!   payload = ( u32 len | codec bytes )*   (gzipped as a whole when flagged)
//! ```

use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::codec::{self, Codec};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geometry::{Coord, Timezone};
use crate::storage::{Candidates, Storage};

/// Magic bytes for the snapshot file format
const MAGIC: &[u8] = b"GTZS";
/// Format version (currently 1)
const VERSION: u8 = 1;

pub struct MemoryStore {
    zones: Vec<Timezone>,
    snapshot: PathBuf,
    codec: Codec,
    compress: bool,
    closed: bool,
}

impl MemoryStore {
    /// Open an existing dataset by decoding its snapshot file.
    pub fn open(config: &Config) -> Result<Self> {
        let snapshot = config.snapshot_path();
        if !snapshot.exists() {
            return Err(Error::Missing(snapshot));
        }
        let start = Instant::now();
        let zones = read_snapshot(&fs::read(&snapshot)?, config.codec)?;
        info!(
            zones = zones.len(),
            elapsed = ?start.elapsed(),
            snapshot = %snapshot.display(),
            "loaded snapshot"
        );
        Ok(Self {
            zones,
            snapshot,
            codec: config.codec,
            compress: config.compress,
            closed: false,
        })
    }

    /// An empty destination; `persist` fills it and writes the snapshot cache.
    pub fn create(config: &Config) -> Self {
        Self {
            zones: Vec::new(),
            snapshot: config.snapshot_path(),
            codec: config.codec,
            compress: config.compress,
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }
}

impl Storage for MemoryStore {
    fn persist(&mut self, zones: &[Timezone]) -> Result<()> {
        self.ensure_open()?;

        let mut payload = Vec::new();
        for tz in zones {
            let bytes = self.codec.encode(tz)?;
            payload.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            payload.extend_from_slice(&bytes);
        }
        if self.compress {
            payload = codec::compress(&payload)?;
        }

        let mut out = Vec::with_capacity(payload.len() + 10);
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.extend_from_slice(&(zones.len() as u32).to_le_bytes());
        out.push(self.compress as u8);
        out.extend_from_slice(&payload);

        if let Some(parent) = self.snapshot.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.snapshot, &out)?;
        info!(zones = zones.len(), snapshot = %self.snapshot.display(), "wrote snapshot");

        self.zones = zones.to_vec();
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Timezone>> {
        self.ensure_open()?;
        Ok(self.zones.clone())
    }

    fn candidates(&self, _pt: Coord) -> Result<Candidates<'_>> {
        self.ensure_open()?;
        // No spatial pruning at this layer; the query engine's bbox filter
        // rejects non-candidates.
        Ok(Candidates::Resident(&self.zones))
    }

    fn close(&mut self) -> Result<()> {
        self.zones = Vec::new();
        self.closed = true;
        Ok(())
    }
}

fn read_snapshot(bytes: &[u8], codec: Codec) -> Result<Vec<Timezone>> {
    let mut cursor = Cursor::new(bytes);

    let mut magic = [0u8; 4];
    cursor
        .read_exact(&mut magic)
        .map_err(|e| Error::Codec(format!("failed to read snapshot magic: {e}")))?;
    if magic != MAGIC {
        return Err(Error::Codec("invalid snapshot file: bad magic bytes".into()));
    }

    let mut version = [0u8; 1];
    cursor
        .read_exact(&mut version)
        .map_err(|e| Error::Codec(format!("failed to read snapshot version: {e}")))?;
    if version[0] != VERSION {
        return Err(Error::Codec(format!(
            "unsupported snapshot version: {}",
            version[0]
        )));
    }

    let mut count_bytes = [0u8; 4];
    cursor
        .read_exact(&mut count_bytes)
        .map_err(|e| Error::Codec(format!("failed to read record count: {e}")))?;
    let count = u32::from_le_bytes(count_bytes) as usize;

    let mut compressed_flag = [0u8; 1];
    cursor
        .read_exact(&mut compressed_flag)
        .map_err(|e| Error::Codec(format!("failed to read compression flag: {e}")))?;

    let mut payload = Vec::new();
    cursor
        .read_to_end(&mut payload)
        .map_err(|e| Error::Codec(format!("failed to read snapshot payload: {e}")))?;
    if compressed_flag[0] != 0 {
        payload = codec::decompress(&payload)?;
    }

    let total = payload.len();
    let mut cursor = Cursor::new(payload.as_slice());
    let mut zones = Vec::with_capacity(count.min(total / 4 + 1));
    for _ in 0..count {
        let mut len_bytes = [0u8; 4];
        cursor
            .read_exact(&mut len_bytes)
            .map_err(|e| Error::Codec(format!("failed to read record length: {e}")))?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let at = cursor.position() as usize;
        if len > total - at {
            return Err(Error::Codec(format!(
                "record length {len} exceeds remaining snapshot ({} bytes)",
                total - at
            )));
        }
        zones.push(codec.decode(&payload[at..at + len])?);
        cursor.set_position((at + len) as u64);
    }

    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageKind;
    use crate::geometry::Polygon;

    fn sample_zones() -> Vec<Timezone> {
        ["Europe/Dublin", "Asia/Tokyo"]
            .into_iter()
            .map(|tzid| {
                let mut tz = Timezone::new(tzid);
                let mut p = Polygon::new();
                for (lon, lat) in [(0.0, 0.0), (0.0, 2.0), (2.0, 2.0)] {
                    p.push(Coord::new(lat, lon));
                }
                tz.polygons.push(p);
                tz
            })
            .collect()
    }

    fn config(dir: &std::path::Path, compress: bool) -> Config {
        Config::new(StorageKind::Memory, dir.join("zones")).with_compression(compress)
    }

    #[test]
    fn persist_then_reopen_restores_zone_order() {
        let dir = tempfile::tempdir().unwrap();
        for compress in [false, true] {
            let config = config(dir.path(), compress);
            let zones = sample_zones();
            let mut store = MemoryStore::create(&config);
            store.persist(&zones).unwrap();

            let reopened = MemoryStore::open(&config).unwrap();
            assert_eq!(reopened.load_all().unwrap(), zones);
        }
    }

    #[test]
    fn open_without_snapshot_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MemoryStore::open(&config(dir.path(), false)),
            Err(Error::Missing(_))
        ));
    }

    #[test]
    fn corrupt_snapshot_is_a_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), false);
        let mut store = MemoryStore::create(&config);
        store.persist(&sample_zones()).unwrap();

        let mut bytes = fs::read(config.snapshot_path()).unwrap();
        bytes.truncate(bytes.len() / 2);
        fs::write(config.snapshot_path(), &bytes).unwrap();
        assert!(matches!(MemoryStore::open(&config), Err(Error::Codec(_))));
    }

    #[test]
    fn close_is_idempotent_and_blocks_reads() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::create(&config(dir.path(), false));
        store.persist(&sample_zones()).unwrap();

        store.close().unwrap();
        store.close().unwrap();
        assert!(matches!(store.load_all(), Err(Error::Closed)));
        assert!(matches!(
            store.candidates(Coord::new(1.0, 1.0)),
            Err(Error::Closed)
        ));
    }
}
