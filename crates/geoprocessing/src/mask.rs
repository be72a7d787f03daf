//! Per-pixel validity masks.
//!
//! All masks share one convention: `true` marks a pixel that must be
//! EXCLUDED from the analysis. Individual mask terms are OR-ed together;
//! a pixel survives only if every term leaves it false.

use ndarray::Array2;

use zonal_common::{GeoTransform, Polygon};

/// Mark pixels that fail a threshold filter: `true` where `value < threshold`.
pub fn mask_by_threshold(array: &Array2<f64>, threshold: f64) -> Array2<bool> {
    array.mapv(|v| v < threshold)
}

/// Mark nodata pixels: `true` where `value == nodata`.
pub fn mask_by_nodata(array: &Array2<f64>, nodata: f64) -> Array2<bool> {
    array.mapv(|v| v == nodata)
}

/// Mark pixels whose CENTER falls outside the polygon.
///
/// Scan-converts the polygon against the pixel grid described by
/// `transform`: each pixel center is tested with ray casting. Pure
/// function, independent of raster I/O.
pub fn geometry_mask(
    geometry: &Polygon,
    transform: &GeoTransform,
    shape: (usize, usize),
) -> Array2<bool> {
    let (rows, cols) = shape;
    Array2::from_shape_fn((rows, cols), |(row, col)| {
        let (x, y) = transform.xy(col as f64 + 0.5, row as f64 + 0.5);
        !geometry.contains_point(x, y)
    })
}

/// OR `term` into `mask` in place.
pub fn or_mask(mask: &mut Array2<bool>, term: &Array2<bool>) {
    mask.zip_mut_with(term, |m, &t| *m = *m || t);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn analysis_array() -> Array2<f64> {
        array![[1.0, 2.0, 3.0], [2.0, 3.0, 4.0], [3.0, 4.0, 5.0]]
    }

    #[test]
    fn test_mask_by_threshold() {
        let result = mask_by_threshold(&analysis_array(), 2.0);
        let expected = array![
            [true, false, false],
            [false, false, false],
            [false, false, false]
        ];
        assert_eq!(result, expected);
    }

    #[test]
    fn test_mask_by_threshold_elementwise_property() {
        let arr = analysis_array();
        for t in [0.0, 2.0, 3.5, 10.0] {
            let mask = mask_by_threshold(&arr, t);
            for (idx, &v) in arr.indexed_iter() {
                assert_eq!(mask[idx], v < t);
            }
        }
    }

    #[test]
    fn test_mask_by_nodata() {
        let result = mask_by_nodata(&analysis_array(), 2.0);
        let expected = array![
            [false, true, false],
            [true, false, false],
            [false, false, false]
        ];
        assert_eq!(result, expected);
    }

    #[test]
    fn test_geometry_mask_square() {
        // Square covering the left two columns of a 3x3 identity grid.
        let polygon = Polygon::new(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 3.0), (0.0, 3.0)]);
        let mask = geometry_mask(&polygon, &GeoTransform::identity(), (3, 3));

        let expected = array![
            [false, false, true],
            [false, false, true],
            [false, false, true]
        ];
        assert_eq!(mask, expected);
    }

    #[test]
    fn test_geometry_mask_north_up() {
        // One-degree pixels, tile top at lat 3: row 0 centers sit at lat 2.5.
        let transform = GeoTransform::north_up(0.0, 3.0, 1.0, -1.0);
        let polygon = Polygon::new(vec![(0.0, 2.0), (3.0, 2.0), (3.0, 3.0), (0.0, 3.0)]);
        let mask = geometry_mask(&polygon, &transform, (3, 3));

        // Only the top row of pixels falls inside the lat 2..3 band.
        let expected = array![
            [false, false, false],
            [true, true, true],
            [true, true, true]
        ];
        assert_eq!(mask, expected);
    }

    #[test]
    fn test_or_mask() {
        let mut mask = array![[true, false], [false, false]];
        let term = array![[false, true], [false, false]];
        or_mask(&mut mask, &term);
        assert_eq!(mask, array![[true, true], [false, false]]);
    }
}
