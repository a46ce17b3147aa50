//! Length-prefixed tagged record format.
//!
//! Layout (all integers little-endian, coordinates f32):
//!
//! ```text
//! 'T' | u32 tzid_len | tzid utf-8 | u32 polygon_count |
//!   ( 'P' | max lat,lon | min lat,lon | u32 coord_count | lat,lon ... )*
//! ```
//!
//! Every length field is checked against the remaining input before any
//! allocation or indexing, so truncated or adversarial bytes fail cleanly.

use std::io::{Cursor, Read};

use crate::error::{Error, Result};
use crate::geometry::{Coord, Polygon, Timezone};

/// Record tag for a Timezone
const TAG_TIMEZONE: u8 = b'T';
/// Record tag for a Polygon
const TAG_POLYGON: u8 = b'P';

pub(super) fn encode(tz: &Timezone) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded_len(tz));
    out.push(TAG_TIMEZONE);
    out.extend_from_slice(&(tz.tzid.len() as u32).to_le_bytes());
    out.extend_from_slice(tz.tzid.as_bytes());
    out.extend_from_slice(&(tz.polygons.len() as u32).to_le_bytes());
    for poly in &tz.polygons {
        out.push(TAG_POLYGON);
        write_coord(&mut out, poly.max);
        write_coord(&mut out, poly.min);
        out.extend_from_slice(&(poly.coords.len() as u32).to_le_bytes());
        for &c in &poly.coords {
            write_coord(&mut out, c);
        }
    }
    Ok(out)
}

pub(super) fn decode(bytes: &[u8]) -> Result<Timezone> {
    let mut cursor = Cursor::new(bytes);

    if read_u8(&mut cursor, "record tag")? != TAG_TIMEZONE {
        return Err(Error::Codec("expected timezone record tag".into()));
    }

    let tzid_len = read_len(&mut cursor, bytes.len(), 1, "tzid length")?;
    let mut tzid_bytes = vec![0u8; tzid_len];
    cursor
        .read_exact(&mut tzid_bytes)
        .map_err(|e| Error::Codec(format!("failed to read tzid: {e}")))?;
    let tzid = String::from_utf8(tzid_bytes)
        .map_err(|e| Error::Codec(format!("tzid is not valid utf-8: {e}")))?;

    let polygon_count = read_len(&mut cursor, bytes.len(), COORD_SIZE * 2 + 5, "polygon count")?;
    let mut polygons = Vec::with_capacity(polygon_count);
    for _ in 0..polygon_count {
        if read_u8(&mut cursor, "polygon tag")? != TAG_POLYGON {
            return Err(Error::Codec("expected polygon record tag".into()));
        }
        let max = read_coord(&mut cursor)?;
        let min = read_coord(&mut cursor)?;
        let coord_count = read_len(&mut cursor, bytes.len(), COORD_SIZE, "coordinate count")?;
        let mut coords = Vec::with_capacity(coord_count);
        for _ in 0..coord_count {
            coords.push(read_coord(&mut cursor)?);
        }
        polygons.push(Polygon { max, min, coords });
    }

    Ok(Timezone { tzid, polygons })
}

const COORD_SIZE: usize = 8;

fn encoded_len(tz: &Timezone) -> usize {
    let polys: usize = tz
        .polygons
        .iter()
        .map(|p| 1 + COORD_SIZE * 2 + 4 + COORD_SIZE * p.coords.len())
        .sum();
    1 + 4 + tz.tzid.len() + 4 + polys
}

fn write_coord(out: &mut Vec<u8>, c: Coord) {
    out.extend_from_slice(&c.lat.to_le_bytes());
    out.extend_from_slice(&c.lon.to_le_bytes());
}

fn read_u8(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<u8> {
    let mut buf = [0u8; 1];
    cursor
        .read_exact(&mut buf)
        .map_err(|e| Error::Codec(format!("failed to read {what}: {e}")))?;
    Ok(buf[0])
}

/// Read a u32 length field and reject it if `len * item_size` cannot fit in
/// the remaining input.
fn read_len(cursor: &mut Cursor<&[u8]>, total: usize, item_size: usize, what: &str) -> Result<usize> {
    let mut buf = [0u8; 4];
    cursor
        .read_exact(&mut buf)
        .map_err(|e| Error::Codec(format!("failed to read {what}: {e}")))?;
    let len = u32::from_le_bytes(buf) as usize;
    let remaining = total.saturating_sub(cursor.position() as usize);
    if len.saturating_mul(item_size) > remaining {
        return Err(Error::Codec(format!(
            "{what} {len} exceeds remaining input ({remaining} bytes)"
        )));
    }
    Ok(len)
}

fn read_coord(cursor: &mut Cursor<&[u8]>) -> Result<Coord> {
    let mut buf = [0u8; COORD_SIZE];
    cursor
        .read_exact(&mut buf)
        .map_err(|e| Error::Codec(format!("failed to read coordinate: {e}")))?;
    Ok(Coord {
        lat: f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        lon: f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
    })
}
