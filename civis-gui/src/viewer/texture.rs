//! Reference image texture.

use egui::ColorImage;
use ndarray::Array2;

use crate::util::f64_to_f32;
use crate::viewer::Colormap;

/// Colours a height × width image, min-max normalised. Row 0 becomes the
/// top texture row.
#[must_use]
pub fn reference_image(image: &Array2<f64>, colormap: Colormap) -> ColorImage {
    let (height, width) = image.dim();
    let (min, max) = image
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = if max > min { max - min } else { 1.0 };

    let mut pixels = Vec::with_capacity(height * width * 4);
    for &value in image {
        let rgba = if value.is_finite() {
            colormap.apply(f64_to_f32((value - min) / span))
        } else {
            [0, 0, 0, 255]
        };
        pixels.extend_from_slice(&rgba);
    }

    ColorImage::from_rgba_unmultiplied([width, height], &pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rows_map_top_down() {
        let image = array![[0.0, 0.0, 0.0], [2.0, 2.0, 2.0]];
        let tex = reference_image(&image, Colormap::Grayscale);
        assert_eq!(tex.size, [3, 2]);
        assert_eq!(tex.pixels[0], egui::Color32::from_gray(0));
        assert_eq!(tex.pixels[3], egui::Color32::from_gray(255));
    }

    #[test]
    fn test_flat_image_does_not_divide_by_zero() {
        let image = Array2::from_elem((2, 2), 5.0);
        let tex = reference_image(&image, Colormap::Grayscale);
        assert_eq!(tex.pixels[0], egui::Color32::from_gray(0));
    }
}
