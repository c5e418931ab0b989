//! Contour extraction from an edge map.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point as PixelPoint;

use crate::geometry::{polygon_area, Point};

/// An outermost contour with its enclosed area.
#[derive(Debug, Clone)]
pub struct ExternalContour {
    /// Border pixels in tracing order.
    pub pixels: Vec<PixelPoint<i32>>,
    /// Same border as floating point coordinates.
    pub points: Vec<Point>,
    /// Enclosed area in px².
    pub area: f32,
}

/// Outer borders that are not nested inside another border.
pub fn external_contours(edges: &GrayImage) -> Vec<ExternalContour> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let points: Vec<Point> = c
                .points
                .iter()
                .map(|p| Point::new(p.x as f32, p.y as f32))
                .collect();
            let area = polygon_area(&points);
            ExternalContour {
                pixels: c.points,
                points,
                area,
            }
        })
        .collect()
}

/// The external contour enclosing the largest area.
///
/// Ties keep the first contour found.
pub fn largest_external_contour(edges: &GrayImage) -> Option<ExternalContour> {
    external_contours(edges)
        .into_iter()
        .fold(None, |best: Option<ExternalContour>, contour| match best {
            Some(b) if b.area >= contour.area => Some(b),
            _ => Some(contour),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn ring(image: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for x in x0..=x1 {
            image.put_pixel(x, y0, Luma([255]));
            image.put_pixel(x, y1, Luma([255]));
        }
        for y in y0..=y1 {
            image.put_pixel(x0, y, Luma([255]));
            image.put_pixel(x1, y, Luma([255]));
        }
    }

    #[test]
    fn test_empty_edges_have_no_contour() {
        let edges = GrayImage::new(20, 20);
        assert!(largest_external_contour(&edges).is_none());
    }

    #[test]
    fn test_largest_ring_wins() {
        let mut edges = GrayImage::new(100, 100);
        ring(&mut edges, 5, 5, 15, 15);
        ring(&mut edges, 30, 30, 90, 80);

        let best = largest_external_contour(&edges).expect("contour");
        assert!((best.area - 60.0 * 50.0).abs() < 200.0, "area {}", best.area);
        assert!(best.points.iter().all(|p| p.x >= 30.0 && p.y >= 30.0));
    }

    #[test]
    fn test_nested_ring_is_not_external() {
        let mut edges = GrayImage::new(60, 60);
        ring(&mut edges, 5, 5, 55, 55);
        ring(&mut edges, 20, 20, 30, 30);

        let contours = external_contours(&edges);
        assert_eq!(contours.len(), 1);
    }
}
