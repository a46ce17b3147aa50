//! Storage backends for built timezone datasets.
//!
//! Callers depend only on the [`Storage`] trait; the two concrete backends
//! differ in where decoded records live. The memory backend keeps the whole
//! dataset resident and lends it out per query; the persistent backend decodes
//! records out of an embedded key-value store on every lookup.

mod memory;
mod persistent;

pub use memory::MemoryStore;
pub use persistent::PersistentStore;

use std::ops::Deref;

use crate::config::{Config, StorageKind};
use crate::error::Result;
use crate::geometry::{Coord, Timezone};

/// Read/write access to one stored dataset.
///
/// `persist` runs once at build time and must not race queries; everything
/// else is a read over immutable post-load state. `close` is idempotent and
/// later calls to the other operations fail cleanly.
pub trait Storage: Send + Sync {
    /// Write the full ordered dataset. Build-time only.
    fn persist(&mut self, zones: &[Timezone]) -> Result<()>;

    /// Decode the full dataset in stored order.
    fn load_all(&self) -> Result<Vec<Timezone>>;

    /// Records that may contain `pt`. Always a superset of the true candidate
    /// set; exact pruning is the query engine's job.
    fn candidates(&self, pt: Coord) -> Result<Candidates<'_>>;

    /// Release backend resources. Safe to call more than once.
    fn close(&mut self) -> Result<()>;
}

/// Candidate records for one query, either lent from resident memory or
/// freshly decoded from storage. Borrowed transiently; never held across
/// queries.
pub enum Candidates<'a> {
    Resident(&'a [Timezone]),
    Decoded(Vec<Timezone>),
}

impl Deref for Candidates<'_> {
    type Target = [Timezone];

    fn deref(&self) -> &[Timezone] {
        match self {
            Candidates::Resident(zones) => zones,
            Candidates::Decoded(zones) => zones,
        }
    }
}

/// Open an existing dataset with the backend named by `config`.
pub(crate) fn open(config: &Config) -> Result<Box<dyn Storage>> {
    Ok(match config.kind {
        StorageKind::Memory => Box::new(MemoryStore::open(config)?),
        StorageKind::Persistent => Box::new(PersistentStore::open(config)?),
    })
}

/// Create an empty dataset destination for a build run.
pub(crate) fn create(config: &Config) -> Result<Box<dyn Storage>> {
    Ok(match config.kind {
        StorageKind::Memory => Box::new(MemoryStore::create(config)),
        StorageKind::Persistent => Box::new(PersistentStore::create(config)?),
    })
}
