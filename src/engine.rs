//! Query engine: an explicit dataset handle over a storage backend.

use std::path::Path;

use tracing::debug;

use crate::boundary;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geometry::{Coord, Timezone};
use crate::storage::{self, Storage};

/// A loaded timezone dataset.
///
/// Obtained from [`Engine::open`] or [`Engine::build`] and threaded through
/// the caller's own state; there is no process-wide handle. `query` is a pure
/// read and may be called from many threads at once. `close` releases the
/// backend; queries after close fail with [`Error::Closed`].
pub struct Engine {
    config: Config,
    storage: Box<dyn Storage>,
}

impl Engine {
    /// Open a previously built dataset.
    pub fn open(config: Config) -> Result<Self> {
        let storage = storage::open(&config)?;
        Ok(Self { config, storage })
    }

    /// One-shot build: decode the GeoJSON boundary source and persist it with
    /// the configured backend, codec and compression.
    pub fn build(config: Config, source: impl AsRef<Path>) -> Result<Self> {
        let zones = boundary::build_timezones(source)?;
        let mut storage = storage::create(&config)?;
        storage.persist(&zones)?;
        Ok(Self { config, storage })
    }

    /// Open the dataset if it exists, otherwise build it from `source` and
    /// cache the result for the next startup.
    pub fn open_or_build(config: Config, source: impl AsRef<Path>) -> Result<Self> {
        if config.data_path().exists() {
            Self::open(config)
        } else {
            debug!(path = %config.data_path().display(), "no cached dataset, building from source");
            Self::build(config, source)
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The full dataset in stored order.
    pub fn load_all(&self) -> Result<Vec<Timezone>> {
        self.storage.load_all()
    }

    /// The tzid of the first stored polygon containing the coordinate.
    ///
    /// Candidates are filtered by bounding box before the exact ray-casting
    /// test runs. Overlap ties resolve by stored iteration order, not by area
    /// or specificity. No containing polygon yields [`Error::NotFound`].
    pub fn query(&self, lat: f32, lon: f32) -> Result<String> {
        let pt = Coord::new(lat, lon);
        let candidates = self.storage.candidates(pt)?;
        for tz in candidates.iter() {
            for poly in &tz.polygons {
                if poly.bbox_contains(pt) && poly.contains(pt) {
                    return Ok(tz.tzid.clone());
                }
            }
        }
        Err(Error::NotFound)
    }

    /// Release backend resources. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        self.storage.close()
    }
}
