//! Display colors for annotations.
//!
//! Colors are derived from the annotation id alone, so an annotation keeps
//! its color across undo and re-render and neighbouring ids stay distinct.

use crate::constants::{ANNOTATION_SATURATION, ANNOTATION_VALUE};

/// Hue increment between consecutive ids, in degrees.
pub const GOLDEN_ANGLE: f32 = 137.5;

/// Fill alpha for generated colors.
const ANNOTATION_ALPHA: f32 = 0.7;

/// RGBA color for the annotation with the given id.
pub fn annotation_color(id: u64) -> [f32; 4] {
    // Reduce before the float conversion so large ids keep their precision.
    let step = (id % 144) as f32;
    let hue = (step * GOLDEN_ANGLE) % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, ANNOTATION_SATURATION, ANNOTATION_VALUE);
    [r, g, b, ANNOTATION_ALPHA]
}

/// Convert HSV to RGB.
///
/// `h` is in degrees (0-360), `s` and `v` in 0.0-1.0. Components of the
/// result are in 0.0-1.0.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (r + m, g + m, b + m)
}

/// CSS `rgba(...)` string for a color, used by canvas hosts.
pub fn to_css_rgba(color: [f32; 4]) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {:.2})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        let (r, g, b) = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((r - 1.0).abs() < 0.01 && g.abs() < 0.01 && b.abs() < 0.01);

        let (r, g, b) = hsv_to_rgb(120.0, 1.0, 1.0);
        assert!(r.abs() < 0.01 && (g - 1.0).abs() < 0.01 && b.abs() < 0.01);

        let (r, g, b) = hsv_to_rgb(240.0, 1.0, 1.0);
        assert!(r.abs() < 0.01 && g.abs() < 0.01 && (b - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_annotation_color_is_stable() {
        assert_eq!(annotation_color(7), annotation_color(7));
    }

    #[test]
    fn test_neighbouring_ids_differ() {
        for id in 1..50 {
            assert_ne!(annotation_color(id), annotation_color(id + 1));
        }
    }

    #[test]
    fn test_annotation_color_in_range() {
        for id in [0, 1, 2, 143, 144, u64::MAX] {
            let color = annotation_color(id);
            assert!(color.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn test_css_rgba() {
        assert_eq!(to_css_rgba([1.0, 0.0, 0.5, 0.7]), "rgba(255, 0, 128, 0.70)");
    }
}
