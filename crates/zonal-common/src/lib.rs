//! Common types and utilities shared across the zonal analysis services.

pub mod bbox;
pub mod error;
pub mod geometry;
pub mod tile;
pub mod transform;
pub mod window;

pub use bbox::BoundingBox;
pub use error::{ZonalError, ZonalResult};
pub use geometry::Polygon;
pub use tile::TileId;
pub use transform::GeoTransform;
pub use window::Window;
