//! Geostore payload types.
//!
//! The geostore service resolves a geostore id to a stored GeoJSON
//! geometry plus its precomputed area in hectares. Only the first feature
//! of the stored feature collection is used, and it must be a polygon.

use serde::Deserialize;
use serde_json::Value;

use zonal_common::{Polygon, ZonalError, ZonalResult};

/// A resolved geostore entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Geostore {
    /// The stored polygon.
    pub geometry: Polygon,
    /// Precomputed geodesic area of the geometry in hectares.
    pub area_ha: f64,
}

#[derive(Deserialize)]
struct GeostoreEnvelope {
    data: GeostoreData,
}

#[derive(Deserialize)]
struct GeostoreData {
    attributes: GeostoreAttributes,
}

#[derive(Deserialize)]
struct GeostoreAttributes {
    geojson: FeatureCollection,
    #[serde(rename = "areaHa")]
    area_ha: f64,
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Value,
}

impl Geostore {
    /// Parse a geostore API response body.
    pub fn from_response(geostore_id: &str, body: &[u8]) -> ZonalResult<Self> {
        let envelope: GeostoreEnvelope = serde_json::from_slice(body).map_err(|e| {
            ZonalError::InternalError(format!("malformed geostore response: {}", e))
        })?;

        let attrs = envelope.data.attributes;
        let area_ha = attrs.area_ha;
        let feature = attrs.features_first().ok_or_else(|| {
            ZonalError::InvalidGeometry(format!("geostore {} holds no features", geostore_id))
        })?;

        let geometry: Polygon = serde_json::from_value(feature).map_err(|e| {
            ZonalError::InvalidGeometry(format!("geostore {}: {}", geostore_id, e))
        })?;
        geometry
            .validate()
            .map_err(|e| ZonalError::InvalidGeometry(e.to_string()))?;

        Ok(Self { geometry, area_ha })
    }
}

impl GeostoreAttributes {
    fn features_first(self) -> Option<Value> {
        self.geojson.features.into_iter().next().map(|f| f.geometry)
    }
}
