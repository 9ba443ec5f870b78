//! Per-pixel and 3×3 convolution math behind the tone and detail filters.
//!
//! Everything here operates on an in-memory `RgbaImage` and never touches
//! the filesystem, so the numeric behaviour is unit testable on tiny
//! hand-built images.
//!
//! Convolution follows the classic photo-editor convention: each kernel has
//! a `scale` divisor and an `offset` added after division, results are
//! clamped to 0..=255, and the one-pixel border is copied from the source
//! unchanged. Alpha is never convolved.

use image::{Rgba, RgbaImage};

/// A 3×3 convolution kernel, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3 {
    pub weights: [i32; 9],
    pub scale: i32,
    pub offset: i32,
}

pub const SHARPEN: Kernel3 = Kernel3 {
    weights: [-2, -2, -2, -2, 32, -2, -2, -2, -2],
    scale: 16,
    offset: 0,
};

pub const FIND_EDGES: Kernel3 = Kernel3 {
    weights: [-1, -1, -1, -1, 8, -1, -1, -1, -1],
    scale: 1,
    offset: 0,
};

pub const CONTOUR: Kernel3 = Kernel3 {
    weights: [-1, -1, -1, -1, 8, -1, -1, -1, -1],
    scale: 1,
    offset: 255,
};

pub const EMBOSS: Kernel3 = Kernel3 {
    weights: [-1, 0, 0, 0, 1, 0, 0, 0, 0],
    scale: 1,
    offset: 128,
};

/// Convolve the colour channels of `image` with `kernel`.
pub fn convolve(image: &RgbaImage, kernel: &Kernel3) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sums = [0i32; 3];
            for ky in 0..3u32 {
                for kx in 0..3u32 {
                    let weight = kernel.weights[(ky * 3 + kx) as usize];
                    if weight == 0 {
                        continue;
                    }
                    let px = image.get_pixel(x + kx - 1, y + ky - 1);
                    for (sum, &channel) in sums.iter_mut().zip(&px.0[..3]) {
                        *sum += weight * channel as i32;
                    }
                }
            }

            let alpha = image.get_pixel(x, y)[3];
            let [r, g, b] = sums.map(|s| (s / kernel.scale + kernel.offset).clamp(0, 255) as u8);
            out.put_pixel(x, y, Rgba([r, g, b, alpha]));
        }
    }

    out
}

/// Keep the `bits` most significant bits of each colour channel.
pub fn posterize(image: &mut RgbaImage, bits: u8) {
    let bits = bits.clamp(1, 8);
    let mask = !(0xFFu8.checked_shr(bits as u32).unwrap_or(0));
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel &= mask;
        }
    }
}

/// Invert every colour channel value at or above `threshold`.
pub fn solarize(image: &mut RgbaImage, threshold: u8) {
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            if *channel >= threshold {
                *channel = 255 - *channel;
            }
        }
    }
}

/// Blend each pixel toward its sepia tone by `intensity` (0.0–1.0).
pub fn sepia(image: &mut RgbaImage, intensity: f32) {
    let intensity = intensity.clamp(0.0, 1.0);
    for pixel in image.pixels_mut() {
        let [r, g, b] = [pixel[0], pixel[1], pixel[2]].map(f32::from);

        let tr = (0.393 * r + 0.769 * g + 0.189 * b).min(255.0);
        let tg = (0.349 * r + 0.686 * g + 0.168 * b).min(255.0);
        let tb = (0.272 * r + 0.534 * g + 0.131 * b).min(255.0);

        pixel[0] = (r + (tr - r) * intensity).round() as u8;
        pixel[1] = (g + (tg - g) * intensity).round() as u8;
        pixel[2] = (b + (tb - b) * intensity).round() as u8;
    }
}

/// Stretch each colour channel so its darkest value maps to 0 and its
/// brightest to 255. Flat channels are left alone.
pub fn autocontrast(image: &mut RgbaImage) {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for pixel in image.pixels() {
        for c in 0..3 {
            lo[c] = lo[c].min(pixel[c]);
            hi[c] = hi[c].max(pixel[c]);
        }
    }

    for pixel in image.pixels_mut() {
        for c in 0..3 {
            if hi[c] > lo[c] {
                let span = (hi[c] - lo[c]) as u32;
                let value = (pixel[c] - lo[c]) as u32;
                pixel[c] = ((value * 255 + span / 2) / span) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn find_edges_on_flat_image_is_black_inside() {
        let img = solid(5, 5, [200, 100, 50, 255]);
        let out = convolve(&img, &FIND_EDGES);
        assert_eq!(out.get_pixel(2, 2).0, [0, 0, 0, 255]);
        // Border is copied
        assert_eq!(out.get_pixel(0, 0).0, [200, 100, 50, 255]);
    }

    #[test]
    fn contour_on_flat_image_is_white_inside() {
        let img = solid(4, 4, [10, 20, 30, 255]);
        let out = convolve(&img, &CONTOUR);
        assert_eq!(out.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn emboss_on_flat_image_is_mid_gray() {
        let img = solid(3, 3, [90, 90, 90, 255]);
        let out = convolve(&img, &EMBOSS);
        assert_eq!(out.get_pixel(1, 1).0, [128, 128, 128, 255]);
    }

    #[test]
    fn sharpen_preserves_flat_image() {
        let img = solid(4, 4, [77, 88, 99, 255]);
        let out = convolve(&img, &SHARPEN);
        assert_eq!(out, img);
    }

    #[test]
    fn convolve_keeps_alpha() {
        let img = solid(3, 3, [50, 50, 50, 40]);
        let out = convolve(&img, &EMBOSS);
        assert_eq!(out.get_pixel(1, 1)[3], 40);
    }

    #[test]
    fn convolve_tiny_image_is_unchanged() {
        let img = solid(2, 2, [1, 2, 3, 4]);
        assert_eq!(convolve(&img, &FIND_EDGES), img);
    }

    #[test]
    fn find_edges_detects_bright_center() {
        let mut img = solid(3, 3, [0, 0, 0, 255]);
        img.put_pixel(1, 1, Rgba([20, 20, 20, 255]));
        let out = convolve(&img, &FIND_EDGES);
        assert_eq!(out.get_pixel(1, 1).0, [160, 160, 160, 255]);
    }

    #[test]
    fn posterize_four_bits() {
        let mut img = solid(1, 1, [0b1011_0111, 255, 0, 9]);
        posterize(&mut img, 4);
        assert_eq!(img.get_pixel(0, 0).0, [0b1011_0000, 0b1111_0000, 0, 9]);
    }

    #[test]
    fn posterize_eight_bits_is_identity() {
        let mut img = solid(1, 1, [123, 45, 67, 255]);
        posterize(&mut img, 8);
        assert_eq!(img.get_pixel(0, 0).0, [123, 45, 67, 255]);
    }

    #[test]
    fn solarize_inverts_above_threshold() {
        let mut img = solid(1, 1, [200, 127, 128, 255]);
        solarize(&mut img, 128);
        assert_eq!(img.get_pixel(0, 0).0, [55, 127, 127, 255]);
    }

    #[test]
    fn sepia_full_intensity_on_white_saturates() {
        let mut img = solid(1, 1, [255, 255, 255, 255]);
        sepia(&mut img, 1.0);
        let px = img.get_pixel(0, 0);
        assert_eq!(px[0], 255);
        assert_eq!(px[1], 255);
        assert_eq!(px[2], 239);
    }

    #[test]
    fn sepia_zero_intensity_is_identity() {
        let mut img = solid(1, 1, [10, 150, 90, 255]);
        sepia(&mut img, 0.0);
        assert_eq!(img.get_pixel(0, 0).0, [10, 150, 90, 255]);
    }

    #[test]
    fn autocontrast_stretches_range() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([50, 100, 7, 255]));
        img.put_pixel(1, 0, Rgba([150, 200, 7, 255]));
        autocontrast(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 7, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 7, 255]);
    }
}
