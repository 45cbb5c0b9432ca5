//! Dominant color extraction over a capped palette

use crate::descriptor::Rgb;
use image::RgbImage;
use std::collections::HashMap;

/// Largest number of distinct colors counted before giving up
pub const MAX_PALETTE_COLORS: usize = 256;

/// Color reported when the palette exceeds [`MAX_PALETTE_COLORS`]
pub const FALLBACK_COLOR: Rgb = [128, 128, 128];

/// Most frequent exact color of the image
///
/// Returns `None` as soon as more than [`MAX_PALETTE_COLORS`] distinct colors
/// are seen, or for an empty image. Ties resolve to the smallest packed RGB
/// value so the result does not depend on hash order.
pub fn dominant_color(image: &RgbImage) -> Option<Rgb> {
    let mut counts: HashMap<Rgb, u64> = HashMap::with_capacity(MAX_PALETTE_COLORS + 1);

    for pixel in image.pixels() {
        *counts.entry(pixel.0).or_insert(0) += 1;
        if counts.len() > MAX_PALETTE_COLORS {
            return None;
        }
    }

    counts
        .into_iter()
        .max_by(|(color_a, count_a), (color_b, count_b)| {
            count_a
                .cmp(count_b)
                .then_with(|| pack(*color_b).cmp(&pack(*color_a)))
        })
        .map(|(color, _)| color)
}

fn pack(color: Rgb) -> u32 {
    (color[0] as u32) << 16 | (color[1] as u32) << 8 | color[2] as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb as Pixel;

    #[test]
    fn test_single_color() {
        let image = RgbImage::from_pixel(8, 8, Pixel([10, 20, 30]));
        assert_eq!(dominant_color(&image), Some([10, 20, 30]));
    }

    #[test]
    fn test_majority_wins() {
        let mut image = RgbImage::from_pixel(10, 10, Pixel([255, 255, 255]));
        for x in 0..10 {
            for y in 0..6 {
                image.put_pixel(x, y, Pixel([0, 0, 255]));
            }
        }
        assert_eq!(dominant_color(&image), Some([0, 0, 255]));
    }

    #[test]
    fn test_tie_prefers_smallest_value() {
        let mut image = RgbImage::from_pixel(2, 1, Pixel([200, 0, 0]));
        image.put_pixel(1, 0, Pixel([0, 0, 200]));
        assert_eq!(dominant_color(&image), Some([0, 0, 200]));
    }

    #[test]
    fn test_too_many_colors() {
        let image = RgbImage::from_fn(32, 32, |x, y| Pixel([x as u8 * 8, y as u8 * 8, 0]));
        assert_eq!(dominant_color(&image), None);
    }

    #[test]
    fn test_empty_image() {
        let image = RgbImage::new(0, 0);
        assert_eq!(dominant_color(&image), None);
    }
}
