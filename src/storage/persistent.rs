//! Persistent backend over an embedded ordered key-value store.
//!
//! One table, key = tzid, value = codec bytes (gzipped when configured).
//! Records are decoded per query inside a read transaction; concurrent
//! readers do not block each other. A build run refuses to touch a
//! destination that already holds data.

use std::path::PathBuf;
use std::time::Instant;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::{info, warn};

use crate::codec::{self, Codec};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geometry::{Coord, Timezone};
use crate::storage::{Candidates, Storage};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("timezones");

pub struct PersistentStore {
    db: Option<Database>,
    path: PathBuf,
    codec: Codec,
    compress: bool,
}

impl PersistentStore {
    /// Open an existing store for serving queries.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.db_path();
        if !path.exists() {
            return Err(Error::Missing(path));
        }
        let db = Database::open(&path)?;
        Ok(Self { db: Some(db), path, codec: config.codec, compress: config.compress })
    }

    /// Create a fresh store for a build run. Fails if the destination file
    /// already exists; there are no merge semantics.
    pub fn create(config: &Config) -> Result<Self> {
        let path = config.db_path();
        if path.exists() {
            return Err(Error::AlreadyExists(path));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(&path)?;
        Ok(Self { db: Some(db), path, codec: config.codec, compress: config.compress })
    }

    fn db(&self) -> Result<&Database> {
        self.db.as_ref().ok_or(Error::Closed)
    }

    fn decode_value(&self, bytes: &[u8]) -> Result<Timezone> {
        if self.compress {
            self.codec.decode(&codec::decompress(bytes)?)
        } else {
            self.codec.decode(bytes)
        }
    }
}

impl Storage for PersistentStore {
    fn persist(&mut self, zones: &[Timezone]) -> Result<()> {
        let start = Instant::now();
        let txn = self.db()?.begin_write()?;
        {
            let mut table = txn.open_table(TABLE)?;
            if table.len()? > 0 {
                return Err(Error::AlreadyExists(self.path.clone()));
            }
            for tz in zones {
                let mut value = self.codec.encode(tz)?;
                if self.compress {
                    value = codec::compress(&value)?;
                }
                table.insert(tz.tzid.as_str(), value.as_slice())?;
            }
        }
        txn.commit()?;
        info!(
            zones = zones.len(),
            elapsed = ?start.elapsed(),
            path = %self.path.display(),
            "persisted timezone database"
        );
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Timezone>> {
        let txn = self.db()?.begin_read()?;
        let table = txn.open_table(TABLE)?;
        let mut zones = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            zones.push(self.decode_value(value.value())?);
        }
        Ok(zones)
    }

    fn candidates(&self, _pt: Coord) -> Result<Candidates<'_>> {
        // Generic layout: every record is a candidate, in key order. A corrupt
        // record is isolated to itself; it yields no containment and the scan
        // continues.
        let txn = self.db()?.begin_read()?;
        let table = txn.open_table(TABLE)?;
        let mut zones = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            match self.decode_value(value.value()) {
                Ok(tz) => zones.push(tz),
                Err(e) => warn!(tzid = %key.value(), error = %e, "skipping corrupt record"),
            }
        }
        Ok(Candidates::Decoded(zones))
    }

    fn close(&mut self) -> Result<()> {
        self.db = None;
        Ok(())
    }
}
