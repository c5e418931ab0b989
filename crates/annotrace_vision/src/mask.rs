//! Region masks built from a freehand path.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PixelPoint;

use crate::error::{Result, VisionError};
use crate::geometry::Point;

/// Mask value for pixels inside the drawn region.
pub const FOREGROUND: u8 = 255;

/// Rasterise the closed path as a filled polygon.
///
/// The mask has the given dimensions; pixels inside the path are
/// [`FOREGROUND`], everything else is zero. Parts of the path outside the
/// image are clipped.
pub fn path_mask(width: u32, height: u32, path: &[Point]) -> Result<GrayImage> {
    if width == 0 || height == 0 {
        return Err(VisionError::EmptyImage);
    }
    let vertices = pixel_vertices(path, width, height)?;
    let mut mask = GrayImage::new(width, height);
    draw_polygon_mut(&mut mask, &vertices, Luma([FOREGROUND]));
    Ok(mask)
}

/// Clip the path to the image, round it onto the pixel grid and drop
/// repeated vertices.
///
/// Non-finite points are skipped. Clipping keeps one pixel of slack around
/// the image so the rasteriser never sees coordinates far off the canvas.
/// `draw_polygon_mut` rejects a polygon whose last vertex repeats the
/// first, so a closing duplicate is removed as well.
fn pixel_vertices(path: &[Point], width: u32, height: u32) -> Result<Vec<PixelPoint<i32>>> {
    let finite: Vec<Point> = path
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    let min = Point::new(-1.0, -1.0);
    let max = Point::new(width as f32, height as f32);
    let clipped = clip_to_rect(&finite, min, max);

    let mut vertices: Vec<PixelPoint<i32>> = Vec::with_capacity(path.len());
    for p in &clipped {
        let v = PixelPoint::new(
            p.x.clamp(min.x, max.x).round() as i32,
            p.y.clamp(min.y, max.y).round() as i32,
        );
        if vertices.last() != Some(&v) {
            vertices.push(v);
        }
    }
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    if vertices.len() < 3 {
        return Err(VisionError::DegeneratePath {
            distinct: vertices.len(),
        });
    }
    Ok(vertices)
}

/// Sutherland-Hodgman clip of a closed path against an axis-aligned box.
fn clip_to_rect(path: &[Point], min: Point, max: Point) -> Vec<Point> {
    let mut output = path.to_vec();
    for side in 0..4 {
        let input = std::mem::take(&mut output);
        let Some(&last) = input.last() else {
            break;
        };
        let inside = |p: Point| match side {
            0 => p.x >= min.x,
            1 => p.x <= max.x,
            2 => p.y >= min.y,
            _ => p.y <= max.y,
        };
        // `a` inside, `b` outside; interpolating from the inside point keeps
        // precision when `b` is far away.
        let crossing = |a: Point, b: Point| {
            let t = match side {
                0 => (min.x - a.x) / (b.x - a.x),
                1 => (max.x - a.x) / (b.x - a.x),
                2 => (min.y - a.y) / (b.y - a.y),
                _ => (max.y - a.y) / (b.y - a.y),
            };
            Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
        };

        let mut prev = last;
        for &current in &input {
            match (inside(prev), inside(current)) {
                (true, true) => output.push(current),
                (false, true) => {
                    output.push(crossing(current, prev));
                    output.push(current);
                }
                (true, false) => output.push(crossing(prev, current)),
                (false, false) => {}
            }
            prev = current;
        }
    }
    output
}

/// Copy of `image` with every pixel outside the mask set to transparent black.
pub fn apply_mask(image: &RgbaImage, mask: &GrayImage) -> RgbaImage {
    let mut masked = RgbaImage::new(image.width(), image.height());
    for (x, y, pixel) in masked.enumerate_pixels_mut() {
        let inside = mask
            .get_pixel_checked(x, y)
            .is_some_and(|m| m.0[0] == FOREGROUND);
        if inside {
            *pixel = *image.get_pixel(x, y);
        } else {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
    masked
}
