use super::*;
use crate::foundation::core::Argb;

fn noise(width: u32, height: u32, seed: u64) -> PixelBuffer {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let pixels = (0..width * height)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u32
        })
        .collect();
    PixelBuffer::new(width, height, pixels).unwrap()
}

/// Direct `O(w * h * r)` evaluation of the same clamped triangular kernel.
fn reference_blur(src: &PixelBuffer, radius: u32) -> Vec<u32> {
    let w = src.width() as i64;
    let h = src.height() as i64;
    let r = radius as i64;
    let divsum = (r + 1) * (r + 1);
    let weight = |i: i64| r + 1 - i.abs();

    let mut tmp = vec![[0u32; 3]; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0i64; 3];
            for i in -r..=r {
                let sx = (x + i).clamp(0, w - 1);
                let p = Argb(src.pixels()[(y * w + sx) as usize]);
                acc[0] += i64::from(p.r()) * weight(i);
                acc[1] += i64::from(p.g()) * weight(i);
                acc[2] += i64::from(p.b()) * weight(i);
            }
            tmp[(y * w + x) as usize] = acc.map(|v| (v / divsum) as u32);
        }
    }

    let mut out = vec![0u32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0i64; 3];
            for i in -r..=r {
                let sy = (y + i).clamp(0, h - 1);
                let c = tmp[(sy * w + x) as usize];
                for k in 0..3 {
                    acc[k] += i64::from(c[k]) * weight(i);
                }
            }
            let [rr, gg, bb] = acc.map(|v| (v / divsum) as u32);
            let alpha = src.pixels()[(y * w + x) as usize] & 0xff00_0000;
            out[(y * w + x) as usize] = alpha | (rr << 16) | (gg << 8) | bb;
        }
    }
    out
}

#[test]
fn radius_zero_is_rejected() {
    let src = PixelBuffer::filled(4, 4, Argb(0xFF10_2030)).unwrap();
    let err = stack_blur(&src, 0).unwrap_err();
    assert!(matches!(err, RevealError::InvalidRadius(0)));
}

#[test]
fn radius_above_filter_limit_is_rejected() {
    let src = PixelBuffer::filled(4, 4, Argb(0xFF10_2030)).unwrap();
    let err = stack_blur(&src, MAX_FILTER_RADIUS + 1).unwrap_err();
    assert!(matches!(err, RevealError::InvalidRadius(_)));
}

#[test]
fn dimensions_and_alpha_are_preserved() {
    let src = noise(23, 17, 7);
    for radius in [1, 2, 5, 9, 30] {
        let out = stack_blur(&src, radius).unwrap();
        assert_eq!(out.width(), src.width());
        assert_eq!(out.height(), src.height());
        for (a, b) in src.pixels().iter().zip(out.pixels()) {
            assert_eq!(a >> 24, b >> 24);
        }
    }
}

#[test]
fn input_is_not_modified() {
    let src = noise(9, 9, 3);
    let before = src.clone();
    let _ = stack_blur(&src, 3).unwrap();
    assert_eq!(src, before);
}

#[test]
fn uniform_image_is_unchanged() {
    for (w, h) in [(1, 1), (1, 7), (7, 1), (10, 6), (100, 100)] {
        let src = PixelBuffer::filled(w, h, Argb(0xC080_8080)).unwrap();
        for radius in [1, 2, 3, 8, 40] {
            let out = stack_blur(&src, radius).unwrap();
            assert_eq!(out, src, "{w}x{h} radius {radius}");
        }
    }
}

#[test]
fn matches_naive_reference() {
    for (w, h, seed) in [(16, 12, 1), (5, 31, 2), (1, 9, 3), (40, 3, 4)] {
        let src = noise(w, h, seed);
        for radius in [1, 2, 3, 4, 7, 12, 50] {
            let out = stack_blur(&src, radius).unwrap();
            assert_eq!(
                out.pixels(),
                reference_blur(&src, radius).as_slice(),
                "{w}x{h} radius {radius}"
            );
        }
    }
}

#[test]
fn larger_radius_flattens_a_sharp_edge() {
    let (w, h) = (40u32, 4u32);
    let pixels = (0..w * h)
        .map(|i| {
            if i % w < w / 2 {
                0xFF00_0000
            } else {
                0xFFFF_FFFF
            }
        })
        .collect();
    let src = PixelBuffer::new(w, h, pixels).unwrap();

    let mut last_gradient = u32::MAX;
    for radius in 1..=8 {
        let out = stack_blur(&src, radius).unwrap();
        let left = u32::from(out.pixel(w / 2 - 1, 1).unwrap().r());
        let right = u32::from(out.pixel(w / 2, 1).unwrap().r());
        let gradient = right - left;
        assert!(gradient < last_gradient, "radius {radius}: {gradient}");
        // Both sides sit symmetrically around the mid-gray average.
        assert!((left + right).abs_diff(255) <= 1);
        last_gradient = gradient;
    }
}

#[test]
fn single_pixel_spreads_over_the_window() {
    let mut src = PixelBuffer::filled(9, 9, Argb(0xFF00_0000)).unwrap();
    src.pixels_mut()[4 * 9 + 4] = 0xFFFF_FFFF;
    let out = stack_blur(&src, 2).unwrap();

    let lit = out.pixels().iter().filter(|&&p| p & 0x00ff_ffff != 0).count();
    assert!(lit > 1);
    assert_eq!(out.pixel(0, 0).unwrap().r(), 0);
    assert!(out.pixel(4, 4).unwrap().r() > out.pixel(5, 4).unwrap().r());
}

#[test]
fn div_table_is_shared_per_radius() {
    let a = div_table(6).unwrap();
    let b = div_table(6).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.radius(), 6);
    assert_eq!(a.divsum(), 49);
    assert_eq!(a.get(49 * 255 + 48), 255);
    assert_eq!(a.get(48), 0);
}
