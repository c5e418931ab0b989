//! Binary edge map of a masked region.

use image::{imageops, GrayImage, RgbaImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

use crate::refine::RefineParams;

/// Grayscale, blur and Canny the image.
///
/// Edge pixels are 255, everything else 0. A non-positive blur sigma skips
/// the blur step.
pub fn edge_map(image: &RgbaImage, params: &RefineParams) -> GrayImage {
    let gray = imageops::grayscale(image);
    let blurred = if params.blur_sigma > 0.0 {
        gaussian_blur_f32(&gray, params.blur_sigma)
    } else {
        gray
    };
    canny(&blurred, params.canny_low, params.canny_high)
}
