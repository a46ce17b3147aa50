//! Interchangeable binary encodings for [`Timezone`] records.
//!
//! Every codec round-trips one record to and from bytes; the bounding box is
//! carried as explicit fields so a corrupted box only misbehaves on that
//! record's pre-filter. The gzip filter is applied by the storage layer, not
//! here, so codecs stay compression-agnostic.

mod record;

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Timezone;

/// Wire encoding for stored timezone records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Self-describing JSON, the slowest and most portable encoding.
    Json,
    /// Schema-driven binary encoding (bincode, standard configuration).
    Bincode,
    /// Length-prefixed tagged record format (see [`record`]).
    Record,
}

impl Codec {
    /// Encode one record. Deterministic for well-formed in-memory records.
    pub fn encode(&self, tz: &Timezone) -> Result<Vec<u8>> {
        match self {
            Codec::Json => serde_json::to_vec(tz).map_err(|e| Error::Codec(e.to_string())),
            Codec::Bincode => bincode::encode_to_vec(tz, bincode::config::standard())
                .map_err(|e| Error::Codec(e.to_string())),
            Codec::Record => record::encode(tz),
        }
    }

    /// Decode one record. Fails with [`Error::Codec`] on truncated or
    /// malformed input; must never panic on adversarial bytes.
    pub fn decode(&self, bytes: &[u8]) -> Result<Timezone> {
        match self {
            Codec::Json => serde_json::from_slice(bytes).map_err(|e| Error::Codec(e.to_string())),
            Codec::Bincode => bincode::decode_from_slice(bytes, bincode::config::standard())
                .map(|(tz, _)| tz)
                .map_err(|e| Error::Codec(e.to_string())),
            Codec::Record => record::decode(bytes),
        }
    }

    /// Short name, used in dataset file suffixes.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Json => "json",
            Codec::Bincode => "bincode",
            Codec::Record => "record",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Codec::Json),
            "bincode" => Ok(Codec::Bincode),
            "record" => Ok(Codec::Record),
            _ => Err(Error::Config(format!(
                "unknown codec: {s}. Expected 'json', 'bincode' or 'record'"
            ))),
        }
    }
}

/// Gzip a byte sequence. Symmetric with [`decompress`].
pub(crate) fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Un-gzip a byte sequence. Corrupt streams surface as [`Error::Codec`].
pub(crate) fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Codec(format!("failed to decompress record: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coord, Polygon};

    const ALL_CODECS: [Codec; 3] = [Codec::Json, Codec::Bincode, Codec::Record];

    fn sample_zone() -> Timezone {
        let mut tz = Timezone::new("Pacific/Auckland");
        let mut p = Polygon::new();
        for (lon, lat) in [(166.4, -47.3), (166.4, -34.1), (178.6, -34.1), (178.6, -47.3)] {
            p.push(Coord::new(lat, lon));
        }
        tz.polygons.push(p);
        let mut enclave = Polygon::new();
        for (lon, lat) in [(-176.9, -44.4), (-176.9, -43.6), (-176.2, -43.6)] {
            enclave.push(Coord::new(lat, lon));
        }
        tz.polygons.push(enclave);
        tz
    }

    #[test]
    fn round_trip_preserves_record_exactly() {
        let tz = sample_zone();
        for codec in ALL_CODECS {
            let bytes = codec.encode(&tz).unwrap();
            let decoded = codec.decode(&bytes).unwrap();
            assert_eq!(decoded, tz, "{codec} round trip");
        }
    }

    #[test]
    fn round_trip_carries_bbox_verbatim() {
        // A record with a deliberately wrong bbox must come back wrong, not
        // silently recomputed.
        let mut tz = sample_zone();
        tz.polygons[0].max = Coord::new(1.0, 1.0);
        for codec in ALL_CODECS {
            let decoded = codec.decode(&codec.encode(&tz).unwrap()).unwrap();
            assert_eq!(decoded.polygons[0].max, Coord::new(1.0, 1.0), "{codec}");
        }
    }

    #[test]
    fn encode_is_deterministic() {
        let tz = sample_zone();
        for codec in ALL_CODECS {
            assert_eq!(codec.encode(&tz).unwrap(), codec.encode(&tz).unwrap());
        }
    }

    #[test]
    fn truncated_input_fails_without_panic() {
        let tz = sample_zone();
        for codec in ALL_CODECS {
            let bytes = codec.encode(&tz).unwrap();
            for cut in [0, 1, 3, bytes.len() / 2, bytes.len() - 1] {
                let err = codec.decode(&bytes[..cut]).unwrap_err();
                assert!(matches!(err, Error::Codec(_)), "{codec} cut={cut}: {err:?}");
            }
        }
    }

    #[test]
    fn garbage_input_fails_without_panic() {
        let garbage: Vec<u8> = (0..256).map(|i| (i * 7 % 251) as u8).collect();
        for codec in ALL_CODECS {
            assert!(matches!(codec.decode(&garbage), Err(Error::Codec(_))));
        }
    }

    #[test]
    fn compression_filter_is_symmetric() {
        let tz = sample_zone();
        let bytes = Codec::Record.encode(&tz).unwrap();
        let packed = compress(&bytes).unwrap();
        assert_eq!(decompress(&packed).unwrap(), bytes);
    }

    #[test]
    fn corrupt_gzip_stream_is_a_codec_error() {
        assert!(matches!(
            decompress(b"not a gzip stream"),
            Err(Error::Codec(_))
        ));
    }

    #[test]
    fn codec_names_parse_round_trip() {
        for codec in ALL_CODECS {
            assert_eq!(codec.name().parse::<Codec>().unwrap(), codec);
        }
        assert!(matches!(
            "protobuf".parse::<Codec>(),
            Err(Error::Config(_))
        ));
    }
}
