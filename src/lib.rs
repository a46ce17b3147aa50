#![doc = "Offline timezone lookup: which timezone polygon contains a coordinate?"]
mod boundary;
mod codec;
mod config;
mod engine;
mod error;
mod geometry;
mod storage;

pub mod cli;
pub mod commands;

#[doc(inline)]
pub use boundary::{build_timezones, build_timezones_from_reader};

#[doc(inline)]
pub use codec::Codec;

#[doc(inline)]
pub use config::{Config, StorageKind};

#[doc(inline)]
pub use engine::Engine;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use geometry::{Coord, Polygon, Timezone};

#[doc(inline)]
pub use storage::{Candidates, MemoryStore, PersistentStore, Storage};
