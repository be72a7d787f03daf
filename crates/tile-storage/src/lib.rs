//! Raster tile access layer.
//!
//! Raster datasets are stored as independent 10°×10° tiles in object
//! storage, one pair of objects per tile:
//!
//! - `{raster_id}/{tile_id}.json` — tile metadata (dimensions, nodata,
//!   geotransform)
//! - `{raster_id}/{tile_id}.bin` — row-major little-endian `f32` pixels
//!
//! The analysis core depends only on the [`TileReader`] contract: a
//! windowed read that distinguishes a *missing tile* (an ordinary,
//! expected outcome) from a transport failure. Missing tiles come back as
//! [`WindowRead::Absent`], never as an error.

pub mod memory;
pub mod reader;
pub mod s3;

pub use memory::MemoryTileReader;
pub use reader::{RasterBand, TileInfo, TileReader, TileStoreError, WindowRead};
pub use s3::{S3TileReader, TileMeta, TileStorageConfig};
