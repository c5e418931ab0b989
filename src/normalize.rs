//! Conversion between pixel coordinates and the unit interval.
//!
//! Coordinates are flat `[x0, y0, x1, y1, ...]` sequences with a top-left
//! origin. X values scale by the image width and y values by the height.
//! A bounding box `[x, y, w, h]` converts correctly with the same rule.

use crate::error::{AnnotatorError, Result};

fn check(coordinates: &[f32], width: u32, height: u32) -> Result<(f32, f32)> {
    if width == 0 || height == 0 {
        return Err(AnnotatorError::InvalidDimensions { width, height });
    }
    if coordinates.len() % 2 != 0 {
        return Err(AnnotatorError::invalid_coordinates(format!(
            "expected x/y pairs, got {} values",
            coordinates.len()
        )));
    }
    Ok((width as f32, height as f32))
}

/// Pixel coordinates to fractions of the image size.
pub fn to_unit(coordinates: &[f32], width: u32, height: u32) -> Result<Vec<f32>> {
    let (w, h) = check(coordinates, width, height)?;
    Ok(coordinates
        .chunks_exact(2)
        .flat_map(|pair| [pair[0] / w, pair[1] / h])
        .collect())
}

/// Fractions of the image size back to pixel coordinates.
pub fn from_unit(coordinates: &[f32], width: u32, height: u32) -> Result<Vec<f32>> {
    let (w, h) = check(coordinates, width, height)?;
    Ok(coordinates
        .chunks_exact(2)
        .flat_map(|pair| [pair[0] * w, pair[1] * h])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_unit_scales_per_axis() {
        let unit = to_unit(&[50.0, 25.0, 200.0, 100.0], 200, 100).expect("valid");
        assert_eq!(unit, vec![0.25, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn test_from_unit() {
        let pixels = from_unit(&[0.5, 0.5, 0.0, 1.0], 640, 480).expect("valid");
        assert_eq!(pixels, vec![320.0, 240.0, 0.0, 480.0]);
    }

    #[test]
    fn test_bbox_converts_with_same_rule() {
        let bbox = [10.0, 10.0, 90.0, 70.0];
        let unit = to_unit(&bbox, 100, 100).expect("valid");
        assert_eq!(unit, vec![0.1, 0.1, 0.9, 0.7]);
    }

    #[test]
    fn test_round_trip_is_close() {
        let coords = [12.5, 7.25, 199.0, 0.0, 33.0, 88.0];
        let back = from_unit(&to_unit(&coords, 300, 90).expect("valid"), 300, 90).expect("valid");
        for (a, b) in coords.iter().zip(&back) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn test_zero_dimension_is_error() {
        assert!(matches!(
            to_unit(&[1.0, 1.0], 0, 10),
            Err(AnnotatorError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(matches!(
            from_unit(&[1.0, 1.0], 10, 0),
            Err(AnnotatorError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_odd_length_is_error() {
        assert!(matches!(
            to_unit(&[1.0, 2.0, 3.0], 10, 10),
            Err(AnnotatorError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_empty_is_empty() {
        assert!(to_unit(&[], 10, 10).expect("valid").is_empty());
    }
}
