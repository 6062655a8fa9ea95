//! Placing a rendered board onto a background photo.

use board::BoardBox;
use image::{RgbaImage, imageops::FilterType};
use rand::Rng;

use crate::error::{SynthError, SynthResult};

/// Draws the board side for a `width`x`height` background: uniform in
/// `[min/4, min - 1]`, never below one pixel.
pub fn choose_scale<R: Rng>(width: u32, height: u32, rng: &mut R) -> SynthResult<u32> {
    let min_dim = width.min(height);
    if min_dim < 2 {
        return Err(SynthError::BackgroundTooSmall { width, height });
    }
    let lo = (min_dim / 4).max(1);
    Ok(rng.random_range(lo..=min_dim - 1))
}

/// Top-left corner such that a `size` board stays inside the background.
pub fn choose_offset<R: Rng>(width: u32, height: u32, size: u32, rng: &mut R) -> (u32, u32) {
    let x = rng.random_range(0..=width - size);
    let y = rng.random_range(0..=height - size);
    (x, y)
}

/// Resamples `src` to `width`x`height` by area averaging.
///
/// Every destination pixel is the coverage-weighted mean of the source pixels
/// under its footprint. Enlarging an axis falls back to triangle
/// interpolation, since area averaging degenerates to nearest-neighbour there.
pub fn resize_area(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    if (sw, sh) == (width, height) {
        return src.clone();
    }
    if width > sw || height > sh {
        return image::imageops::resize(src, width, height, FilterType::Triangle);
    }

    let xw = area_weights(sw, width);
    let yw = area_weights(sh, height);

    // horizontal pass: width x sh
    let mut rows = vec![[0f32; 4]; (width * sh) as usize];
    for y in 0..sh {
        for (dx, taps) in xw.iter().enumerate() {
            let mut acc = [0f32; 4];
            for &(sx, w) in taps {
                let p = src.get_pixel(sx, y);
                for c in 0..4 {
                    acc[c] += f32::from(p[c]) * w;
                }
            }
            rows[(y * width) as usize + dx] = acc;
        }
    }

    let mut out = RgbaImage::new(width, height);
    for (dy, taps) in yw.iter().enumerate() {
        for x in 0..width {
            let mut acc = [0f32; 4];
            for &(sy, w) in taps {
                let p = rows[(sy * width + x) as usize];
                for c in 0..4 {
                    acc[c] += p[c] * w;
                }
            }
            let px = out.get_pixel_mut(x, dy as u32);
            for c in 0..4 {
                px[c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Normalised source taps for each destination index along one axis.
fn area_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(u32, f32)>> {
    let scale = f64::from(src_len) / f64::from(dst_len);
    (0..dst_len)
        .map(|d| {
            let start = f64::from(d) * scale;
            let end = (f64::from(d + 1) * scale).min(f64::from(src_len));
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_len);
            (first..last)
                .filter_map(|s| {
                    let cover = end.min(f64::from(s + 1)) - start.max(f64::from(s));
                    (cover > 1e-9).then(|| (s, (cover / scale) as f32))
                })
                .collect()
        })
        .collect()
}

/// Blends `board` over `bg` with its top-left corner at `(x, y)`.
///
/// Colour channels become `a * board + (1 - a) * bg` with `a` the board's
/// alpha; the background's own alpha is left as is.
pub fn blend_onto(bg: &mut RgbaImage, board: &RgbaImage, x: u32, y: u32) {
    for (bx, by, src) in board.enumerate_pixels() {
        let dst = bg.get_pixel_mut(x + bx, y + by);
        let a = u32::from(src[3]);
        for c in 0..3 {
            let v = u32::from(src[c]) * a + u32::from(dst[c]) * (255 - a);
            dst[c] = ((v + 127) / 255) as u8;
        }
    }
}

/// Places `board` at a random scale and position on a copy of `background`.
pub fn composite<R: Rng>(
    background: &RgbaImage,
    board: &RgbaImage,
    rng: &mut R,
) -> SynthResult<(RgbaImage, BoardBox)> {
    let (width, height) = background.dimensions();
    let size = choose_scale(width, height, rng)?;
    let scaled = resize_area(board, size, size);
    let (x, y) = choose_offset(width, height, size, rng);

    let mut out = background.clone();
    blend_onto(&mut out, &scaled, x, y);
    Ok((out, BoardBox::at(x, y, size)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn checker(size: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgba([240, 217, 181, 255])
            } else {
                Rgba([181, 136, 99, 200])
            }
        })
    }

    #[test]
    fn scale_and_box_stay_in_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let board = checker(64);
        for (w, h) in [(800, 600), (600, 800), (37, 90), (8, 8), (4, 1000), (2, 2)] {
            let bg = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255]));
            let min_dim = w.min(h);
            for _ in 0..20 {
                let (img, bbox) = composite(&bg, &board, &mut rng).unwrap();
                assert_eq!(img.dimensions(), (w, h));
                let s = bbox.side();
                assert!(s >= (min_dim / 4).max(1) && s <= min_dim - 1, "{s} for {w}x{h}");
                assert!(bbox.fits_within(w, h));
                assert_eq!(bbox.y_max() - bbox.y_min(), s);
            }
        }
    }

    #[test]
    fn tiny_background_is_rejected() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let bg = RgbaImage::new(1, 50);
        assert!(matches!(
            composite(&bg, &checker(16), &mut rng),
            Err(SynthError::BackgroundTooSmall { width: 1, height: 50 })
        ));
    }

    #[test]
    fn same_seed_same_output() {
        let bg = RgbaImage::from_fn(300, 200, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let board = checker(120);
        let a = composite(&bg, &board, &mut Xoshiro256PlusPlus::seed_from_u64(5)).unwrap();
        let b = composite(&bg, &board, &mut Xoshiro256PlusPlus::seed_from_u64(5)).unwrap();
        assert_eq!(a.1, b.1);
        assert_eq!(a.0.as_raw(), b.0.as_raw());
    }

    #[test]
    fn blend_follows_alpha() {
        let mut bg = RgbaImage::from_pixel(3, 1, Rgba([100, 100, 100, 77]));
        let board = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([200, 0, 50, 0]),
            1 => Rgba([200, 0, 50, 255]),
            _ => Rgba([200, 0, 50, 128]),
        });
        blend_onto(&mut bg, &board, 0, 0);
        assert_eq!(bg.get_pixel(0, 0), &Rgba([100, 100, 100, 77]));
        assert_eq!(bg.get_pixel(1, 0), &Rgba([200, 0, 50, 77]));
        // 200*128/255 + 100*127/255 = 150.2
        assert_eq!(bg.get_pixel(2, 0), &Rgba([150, 50, 75, 77]));
    }

    #[test]
    fn blend_only_touches_the_placed_region() {
        let mut bg = RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255]));
        let board = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        blend_onto(&mut bg, &board, 3, 5);
        for (x, y, p) in bg.enumerate_pixels() {
            let inside = (3..7).contains(&x) && (5..9).contains(&y);
            let expected = if inside { [9, 9, 9, 255] } else { [1, 2, 3, 255] };
            assert_eq!(p.0, expected, "pixel {x},{y}");
        }
    }

    #[test]
    fn area_resize_averages_blocks() {
        let src = RgbaImage::from_fn(4, 4, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([200, 100, 50, 255])
            }
        });
        let out = resize_area(&src, 2, 2);
        for p in out.pixels() {
            assert_eq!(p, &Rgba([100, 50, 25, 255]));
        }
    }

    #[test]
    fn area_resize_handles_fractional_footprints() {
        let src = RgbaImage::from_fn(3, 1, |x, _| Rgba([(x * 90) as u8, 0, 0, 255]));
        let out = resize_area(&src, 2, 1);
        // [0, 90, 180] -> (0 + 0.5*90)/1.5 = 30, (0.5*90 + 180)/1.5 = 150
        assert_eq!(out.get_pixel(0, 0)[0], 30);
        assert_eq!(out.get_pixel(1, 0)[0], 150);
        assert_eq!(out.get_pixel(1, 0)[3], 255);
    }

    #[test]
    fn upscale_keeps_requested_size() {
        let out = resize_area(&checker(16), 40, 40);
        assert_eq!(out.dimensions(), (40, 40));
    }
}
