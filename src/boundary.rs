//! Boundary builder: raw GeoJSON-shaped features to [`Timezone`] records.
//!
//! Geometry decoding is explicit: the `type` tag is matched against the two
//! supported shapes and the nested coordinate arrays are deserialized into
//! typed vectors, so malformed numerics abort the build instead of panicking
//! deep inside an untyped traversal. Features with an unrecognized geometry
//! kind are skipped (no record emitted) and the build continues.
//!
//! Ring handling mirrors the source dataset conventions: for a `Polygon`
//! geometry each top-level ring becomes one [`Polygon`] record; for a
//! `MultiPolygon` each member's rings are merged into a single [`Polygon`].
//! Interior rings are not distinguished from exterior ones.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::geometry::{Coord, Polygon, Timezone};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Properties,
    geometry: RawGeometry,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(default)]
    tzid: String,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Value,
}

/// A `[lon, lat, ...]` position; trailing dimensions are ignored.
type Position = Vec<f64>;
type Ring = Vec<Position>;

/// Build timezone records from a GeoJSON boundary file.
///
/// Emitted record order follows input feature order; that order is the
/// arbitration rule for overlapping polygons at query time.
pub fn build_timezones(path: impl AsRef<Path>) -> Result<Vec<Timezone>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Missing(path.to_path_buf()));
    }
    build_timezones_from_reader(BufReader::new(File::open(path)?))
}

/// Build timezone records from a stream of one or more concatenated
/// FeatureCollection documents.
pub fn build_timezones_from_reader(reader: impl Read) -> Result<Vec<Timezone>> {
    let start = Instant::now();
    let mut zones = Vec::new();

    for document in serde_json::Deserializer::from_reader(reader).into_iter::<FeatureCollection>() {
        let document = document.map_err(|e| Error::Decode(e.to_string()))?;
        for feature in document.features {
            if let Some(tz) = decode_feature(feature)? {
                zones.push(tz);
            }
        }
    }

    info!(
        zones = zones.len(),
        elapsed = ?start.elapsed(),
        "decoded boundary source"
    );
    Ok(zones)
}

fn decode_feature(feature: Feature) -> Result<Option<Timezone>> {
    let mut tz = Timezone::new(feature.properties.tzid);
    match feature.geometry.kind.as_str() {
        "Polygon" => {
            let rings: Vec<Ring> = from_coordinates(feature.geometry.coordinates)?;
            for ring in &rings {
                let mut poly = Polygon::new();
                push_ring(&mut poly, ring)?;
                tz.polygons.push(poly);
            }
        }
        "MultiPolygon" => {
            let members: Vec<Vec<Ring>> = from_coordinates(feature.geometry.coordinates)?;
            for member in &members {
                let mut poly = Polygon::new();
                for ring in member {
                    push_ring(&mut poly, ring)?;
                }
                tz.polygons.push(poly);
            }
        }
        other => {
            warn!(tzid = %tz.tzid, kind = %other, "skipping feature with unsupported geometry kind");
            return Ok(None);
        }
    }
    Ok(Some(tz))
}

fn from_coordinates<T: serde::de::DeserializeOwned>(coordinates: Value) -> Result<T> {
    serde_json::from_value(coordinates)
        .map_err(|e| Error::Decode(format!("malformed coordinates: {e}")))
}

fn push_ring(poly: &mut Polygon, ring: &Ring) -> Result<()> {
    for position in ring {
        if position.len() < 2 {
            return Err(Error::Decode(format!(
                "position has {} components, expected at least 2",
                position.len()
            )));
        }
        poly.push(Coord::new(position[1] as f32, position[0] as f32));
    }
    Ok(())
}
