//! Domain types for timezone boundaries.
//!
//! A [`Timezone`] owns one or more boundary rings ([`Polygon`]), each carrying
//! its axis-aligned bounding box so the query path can reject most candidates
//! without touching the vertex list. Values are immutable once built; the
//! bounding box is computed incrementally during construction and carried
//! through every encoding rather than recomputed on decode.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A geographic coordinate. Used both as a query point and as a polygon vertex.
///
/// Latitude/longitude ranges are the caller's responsibility; nothing is
/// enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Coord {
    pub lat: f32,
    pub lon: f32,
}

impl Coord {
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }
}

/// A single boundary ring with its precomputed bounding box.
///
/// The ring is implicitly closed: the last vertex connects back to the first.
/// Invariant: `max`/`min` bound every vertex componentwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Polygon {
    pub max: Coord,
    pub min: Coord,
    pub coords: Vec<Coord>,
}

impl Polygon {
    /// An empty polygon with the bounding box seeded so the first vertex
    /// tightens both corners.
    pub fn new() -> Self {
        Self {
            max: Coord::new(-90.0, -180.0),
            min: Coord::new(90.0, 180.0),
            coords: Vec::new(),
        }
    }

    /// Append a vertex, widening the bounding box to cover it.
    pub fn push(&mut self, c: Coord) {
        if self.max.lat < c.lat {
            self.max.lat = c.lat;
        }
        if self.max.lon < c.lon {
            self.max.lon = c.lon;
        }
        if self.min.lat > c.lat {
            self.min.lat = c.lat;
        }
        if self.min.lon > c.lon {
            self.min.lon = c.lon;
        }
        self.coords.push(c);
    }

    /// Cheap pre-filter: is `pt` inside the bounding box (inclusive)?
    ///
    /// Containment implies bbox containment, never the reverse.
    #[inline]
    pub fn bbox_contains(&self, pt: Coord) -> bool {
        pt.lat >= self.min.lat
            && pt.lat <= self.max.lat
            && pt.lon >= self.min.lon
            && pt.lon <= self.max.lon
    }

    /// Exact point-in-polygon test by ray-casting parity.
    ///
    /// Walks every edge of the ring (closing edge included) and toggles on
    /// each crossing of the horizontal ray from `pt`; an odd crossing count
    /// means containment. A ring with fewer than 3 vertices contains nothing.
    pub fn contains(&self, pt: Coord) -> bool {
        if self.coords.len() < 3 {
            return false;
        }
        let mut inside =
            ray_intersects_segment(pt, self.coords[self.coords.len() - 1], self.coords[0]);
        for w in self.coords.windows(2) {
            if ray_intersects_segment(pt, w[0], w[1]) {
                inside = !inside;
            }
        }
        inside
    }
}

impl Default for Polygon {
    fn default() -> Self {
        Self::new()
    }
}

/// Does the horizontal ray from `p` cross the segment `a`..`b`?
#[inline]
fn ray_intersects_segment(p: Coord, a: Coord, b: Coord) -> bool {
    (a.lon > p.lon) != (b.lon > p.lon)
        && p.lat < (b.lat - a.lat) * (p.lon - a.lon) / (b.lon - a.lon) + a.lat
}

/// One timezone region: a stable identifier plus its boundary rings.
///
/// A political timezone often spans several landmasses, so one record may own
/// many disjoint polygons. Stored order is significant: it is the arbitration
/// rule when overlapping polygons both contain a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Timezone {
    pub tzid: String,
    pub polygons: Vec<Polygon>,
}

impl Timezone {
    pub fn new(tzid: impl Into<String>) -> Self {
        Self { tzid: tzid.into(), polygons: Vec::new() }
    }

    /// True if any polygon (in stored order) contains `pt`.
    pub fn contains(&self, pt: Coord) -> bool {
        self.polygons
            .iter()
            .any(|poly| poly.bbox_contains(pt) && poly.contains(pt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        // (lon, lat) ring spanning 0..10 on both axes
        let mut p = Polygon::new();
        for (lon, lat) in [(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)] {
            p.push(Coord::new(lat, lon));
        }
        p
    }

    #[test]
    fn bbox_tracks_vertices() {
        let p = square();
        assert_eq!(p.max, Coord::new(10.0, 10.0));
        assert_eq!(p.min, Coord::new(0.0, 0.0));
    }

    #[test]
    fn square_contains_interior_point() {
        assert!(square().contains(Coord::new(5.0, 5.0)));
    }

    #[test]
    fn square_excludes_exterior_point() {
        let p = square();
        assert!(!p.contains(Coord::new(15.0, 15.0)));
        assert!(!p.bbox_contains(Coord::new(15.0, 15.0)));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let mut p = Polygon::new();
        p.push(Coord::new(0.0, 0.0));
        p.push(Coord::new(10.0, 10.0));
        assert!(!p.contains(Coord::new(5.0, 5.0)));
    }

    #[test]
    fn containment_invariant_under_ring_rotation() {
        let p = square();
        let probes = [
            Coord::new(5.0, 5.0),
            Coord::new(15.0, 15.0),
            Coord::new(-1.0, 4.0),
            Coord::new(9.9, 0.1),
        ];
        for start in 0..p.coords.len() {
            let mut rotated = Polygon::new();
            for i in 0..p.coords.len() {
                rotated.push(p.coords[(start + i) % p.coords.len()]);
            }
            for probe in probes {
                assert_eq!(
                    p.contains(probe),
                    rotated.contains(probe),
                    "rotation by {start} changed result for {probe:?}"
                );
            }
        }
    }

    #[test]
    fn containment_implies_bbox_containment() {
        // Non-convex ring exercises the parity test away from the bbox edges.
        let mut p = Polygon::new();
        for (lon, lat) in [(0.0, 0.0), (4.0, 8.0), (8.0, 0.0), (4.0, 3.0)] {
            p.push(Coord::new(lat, lon));
        }
        for lat in -2..10 {
            for lon in -2..10 {
                let pt = Coord::new(lat as f32 + 0.5, lon as f32 + 0.5);
                if p.contains(pt) {
                    assert!(p.bbox_contains(pt), "contained point outside bbox: {pt:?}");
                }
            }
        }
    }

    #[test]
    fn edge_point_is_deterministic() {
        let p = square();
        let on_edge = Coord::new(0.0, 5.0);
        let first = p.contains(on_edge);
        for _ in 0..100 {
            assert_eq!(p.contains(on_edge), first);
        }
    }

    #[test]
    fn timezone_checks_all_polygons() {
        let mut tz = Timezone::new("Test/Zone");
        tz.polygons.push(square());
        let mut far = Polygon::new();
        for (lon, lat) in [(20.0, 20.0), (20.0, 30.0), (30.0, 30.0), (30.0, 20.0)] {
            far.push(Coord::new(lat, lon));
        }
        tz.polygons.push(far);
        assert!(tz.contains(Coord::new(25.0, 25.0)));
        assert!(tz.contains(Coord::new(5.0, 5.0)));
        assert!(!tz.contains(Coord::new(15.0, 15.0)));
    }
}
