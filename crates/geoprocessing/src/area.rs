//! Geodesic pixel areas on the WGS84 ellipsoid.
//!
//! Pixel size is constant in degrees but not on the ground: a pixel near
//! the equator covers more area than one at high latitude. The area of a
//! pixel row is the ellipsoid band between the row's top and bottom edge
//! latitudes, scaled by the pixel width's fraction of a full parallel.

use zonal_common::GeoTransform;

/// WGS84 semi-major axis in meters.
const SEMI_MAJOR: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in meters.
const SEMI_MINOR: f64 = 6_356_752.314_245_179;

/// Area on the ellipsoid between the equator and latitude `lat`, for a
/// full 360° band, up to the constant factor applied in [`pixel_area`].
fn zone_to_equator(lat: f64) -> f64 {
    let e = (1.0 - (SEMI_MINOR / SEMI_MAJOR).powi(2)).sqrt();
    let s = lat.to_radians().sin();

    std::f64::consts::PI
        * SEMI_MINOR.powi(2)
        * (2.0 * (e * s).atanh() / (2.0 * e) + s / ((1.0 + e * s) * (1.0 - e * s)))
}

/// Ground area in m² of the pixel at `row` under `transform`.
///
/// Computed from the transform's pixel width/height and the latitudes of
/// the pixel's top and bottom edges. Strictly positive for any non-empty
/// pixel.
pub fn pixel_area(transform: &GeoTransform, row: usize) -> f64 {
    let lat_top = transform.row_north_lat(row);
    let lat_bottom = lat_top - transform.pixel_height();

    (zone_to_equator(lat_top) - zone_to_equator(lat_bottom)).abs()
        * (transform.pixel_width() / 360.0)
}
