use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

use crate::{Codec, StorageKind};

/// Timezone lookup CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "geotz", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a timezone database from a GeoJSON boundary file
    Build(BuildArgs),

    /// Look up the timezone containing a coordinate
    Lookup(LookupArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum StorageArg {
    Memory,
    Persistent,
}

impl From<StorageArg> for StorageKind {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::Memory => StorageKind::Memory,
            StorageArg::Persistent => StorageKind::Persistent,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum CodecArg {
    Json,
    Bincode,
    Record,
}

impl From<CodecArg> for Codec {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Json => Codec::Json,
            CodecArg::Bincode => Codec::Bincode,
            CodecArg::Record => Codec::Record,
        }
    }
}

/// Dataset selection flags shared by both subcommands.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Dataset path stem; codec and kind suffixes are appended
    #[arg(short, long, default_value = "timezone", value_hint = ValueHint::FilePath)]
    pub dataset: PathBuf,

    /// Storage backend
    #[arg(short, long, value_enum, default_value = "memory")]
    pub storage: StorageArg,

    /// Record encoding
    #[arg(short, long, value_enum, default_value = "record")]
    pub codec: CodecArg,

    /// Gzip stored records
    #[arg(long)]
    pub compress: bool,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// GeoJSON boundary file, e.g. timezones.geojson
    #[arg(value_hint = ValueHint::FilePath)]
    pub geojson: PathBuf,

    #[command(flatten)]
    pub dataset: DatasetArgs,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Latitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub lat: f32,

    /// Longitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub lon: f32,

    #[command(flatten)]
    pub dataset: DatasetArgs,
}
