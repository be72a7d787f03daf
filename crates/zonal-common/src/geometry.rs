//! Polygon geometry: GeoJSON parsing, bounds, and point containment.

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

/// A polygon with a single exterior ring, in geographic coordinates.
///
/// Serializes to and from a GeoJSON `Polygon` geometry object. Interior
/// rings (holes) are not supported; only the exterior ring is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Exterior ring vertices as `(lon, lat)` pairs. Closed: the last
    /// vertex repeats the first.
    pub ring: Vec<(f64, f64)>,
}

impl Polygon {
    /// Create a polygon from ring vertices, closing the ring if needed.
    pub fn new(mut ring: Vec<(f64, f64)>) -> Self {
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }
        Self { ring }
    }

    /// Validate the ring: at least a closed triangle with finite coordinates.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.ring.len() < 4 {
            return Err(GeometryError::TooFewVertices(self.ring.len()));
        }
        if self.ring.first() != self.ring.last() {
            return Err(GeometryError::RingNotClosed);
        }
        for &(lon, lat) in &self.ring {
            if !lon.is_finite() || !lat.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate);
            }
        }
        Ok(())
    }

    /// Calculate the bounding box of the ring.
    pub fn bounds(&self) -> BoundingBox {
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for &(x, y) in &self.ring {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    /// Check if a point is inside the polygon using ray casting.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        let n = self.ring.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;

        for i in 0..n {
            let (xi, yi) = self.ring[i];
            let (xj, yj) = self.ring[j];

            if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }

        inside
    }
}

/// Errors validating or parsing a polygon.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    #[error("polygon ring has too few vertices: {0}")]
    TooFewVertices(usize),

    #[error("polygon ring is not closed")]
    RingNotClosed,

    #[error("polygon contains a non-finite coordinate")]
    NonFiniteCoordinate,

    #[error("unsupported geometry type: {0}, expected Polygon")]
    UnsupportedType(String),
}

/// GeoJSON wire form of a polygon geometry.
#[derive(Serialize, Deserialize)]
struct GeoJsonPolygon {
    #[serde(rename = "type")]
    type_: String,
    coordinates: Vec<Vec<[f64; 2]>>,
}

impl Serialize for Polygon {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ring: Vec<[f64; 2]> = self.ring.iter().map(|&(x, y)| [x, y]).collect();
        GeoJsonPolygon {
            type_: "Polygon".to_string(),
            coordinates: vec![ring],
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Polygon {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = GeoJsonPolygon::deserialize(deserializer)?;
        if raw.type_ != "Polygon" {
            return Err(serde::de::Error::custom(GeometryError::UnsupportedType(
                raw.type_,
            )));
        }
        let ring = raw
            .coordinates
            .into_iter()
            .next()
            .ok_or_else(|| serde::de::Error::custom("polygon has no rings"))?;
        Ok(Polygon::new(ring.into_iter().map(|[x, y]| (x, y)).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Polygon {
        Polygon::new(vec![(0.0, 0.0), (1.0, 1.0), (1.0, 0.0)])
    }

    #[test]
    fn test_ring_is_closed() {
        let polygon = unit_triangle();
        assert_eq!(polygon.ring.len(), 4);
        assert_eq!(polygon.ring.first(), polygon.ring.last());
        assert!(polygon.validate().is_ok());
    }

    #[test]
    fn test_bounds() {
        let bounds = unit_triangle().bounds();
        assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_contains_point() {
        let polygon = unit_triangle();
        assert!(polygon.contains_point(0.75, 0.25));
        assert!(!polygon.contains_point(0.25, 0.75));
        assert!(!polygon.contains_point(2.0, 0.5));
    }

    #[test]
    fn test_geojson_roundtrip() {
        let json = r#"{"type":"Polygon","coordinates":[[[9.0,4.1],[9.1,4.1],[9.1,4.2],[9.0,4.2],[9.0,4.1]]]}"#;
        let polygon: Polygon = serde_json::from_str(json).unwrap();
        assert_eq!(polygon.ring.len(), 5);
        assert_eq!(polygon.ring[0], (9.0, 4.1));

        let back = serde_json::to_value(&polygon).unwrap();
        assert_eq!(back["type"], "Polygon");
        assert_eq!(back["coordinates"][0][2][1], 4.2);
    }

    #[test]
    fn test_rejects_point_geometry() {
        let json = r#"{"type":"Point","coordinates":[[[0.0,0.0]]]}"#;
        assert!(serde_json::from_str::<Polygon>(json).is_err());
    }
}
