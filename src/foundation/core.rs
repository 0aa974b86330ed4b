use std::time::Duration;

use crate::foundation::error::{RevealError, RevealResult};
use crate::foundation::math::Fnv1a64;

/// Number of precomputed blur frames in a ladder.
pub const KEY_FRAME_COUNT: u32 = 5;
/// Delay between consecutive fade ticks.
pub const TICK_PERIOD: Duration = Duration::from_millis(66);
/// Hold used when `play_animation` is called with a non-positive wait.
pub const DEFAULT_HOLD: Duration = Duration::from_millis(2000);
/// Upper bound for `max_radius_px / sampling_stride`.
pub const MAX_SUPPORTED_BLUR_PIXELS: u32 = 40;
/// Overlay alpha (out of 255) shown over the most blurred frame.
pub const INITIAL_OVERLAY_ALPHA: u8 = 125;
/// Maximum blur radius as a fraction of the display height.
pub const MAX_BLUR_FRACTION_OF_HEIGHT: f64 = 0.04;
/// Sampling stride the budget search starts from.
pub const INITIAL_SAMPLING_STRIDE: u32 = 4;

/// A packed `0xAARRGGBB` pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Argb(pub u32);

impl Argb {
    /// Pack straight (non-premultiplied) channels.
    pub fn from_channels(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    pub fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// `[r, g, b, a]` byte order, as used by `image::Rgba<u8>`.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }

    pub fn from_rgba(px: [u8; 4]) -> Self {
        Self::from_channels(px[3], px[0], px[1], px[2])
    }
}

/// Black full-bleed overlay drawn over the current frame during a reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OverlayColor {
    /// Overlay opacity, `0` = invisible, `255` = opaque black.
    pub alpha: u8,
}

impl OverlayColor {
    pub fn new(alpha: u8) -> Self {
        Self { alpha }
    }

    /// Overlay used before and after an animation.
    pub fn initial() -> Self {
        Self::new(INITIAL_OVERLAY_ALPHA)
    }

    pub fn clear() -> Self {
        Self::new(0)
    }

    /// Paint color as packed ARGB (`alpha << 24`, black RGB).
    pub fn argb(self) -> Argb {
        Argb::from_channels(self.alpha, 0, 0, 0)
    }
}

/// Row-major buffer of packed ARGB pixels.
///
/// Invariant: `pixels.len() == width * height`, both dimensions non-zero.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.pixels.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Wrap an existing pixel vector, validating its length.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> RevealResult<Self> {
        let expected = pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(RevealError::validation(format!(
                "pixel buffer expects {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Allocate a buffer filled with one color. Allocation failure is reported, not aborted.
    pub fn filled(width: u32, height: u32, color: Argb) -> RevealResult<Self> {
        let len = pixel_count(width, height)?;
        let mut pixels = try_alloc_pixels(len)?;
        pixels.resize(len, color.0);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from straight RGBA8 bytes (`[r, g, b, a]` per pixel).
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> RevealResult<Self> {
        let len = pixel_count(width, height)?;
        if rgba.len() != len * 4 {
            return Err(RevealError::validation(
                "from_rgba8 expects width*height*4 bytes",
            ));
        }
        let mut pixels = try_alloc_pixels(len)?;
        pixels.extend(
            rgba.chunks_exact(4)
                .map(|px| Argb::from_rgba([px[0], px[1], px[2], px[3]]).0),
        );
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Straight RGBA8 bytes (`[r, g, b, a]` per pixel).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            out.extend_from_slice(&Argb(p).to_rgba());
        }
        out
    }

    pub fn from_image(img: &image::RgbaImage) -> RevealResult<Self> {
        Self::from_rgba8(img.width(), img.height(), img.as_raw())
    }

    pub fn to_image(&self) -> RevealResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.to_rgba8())
            .ok_or_else(|| RevealError::image("rgba buffer does not match image dimensions"))
    }

    /// Copy into freshly allocated storage, surfacing allocation failure.
    pub fn try_clone(&self) -> RevealResult<Self> {
        let mut pixels = try_alloc_pixels(self.pixels.len())?;
        pixels.extend_from_slice(&self.pixels);
        Ok(Self {
            width: self.width,
            height: self.height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Argb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels.get(idx).copied().map(Argb)
    }

    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Content hash over dimensions and pixels.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new();
        h.write_u32(self.width);
        h.write_u32(self.height);
        for &p in &self.pixels {
            h.write_u32(p);
        }
        h.finish()
    }
}

/// Allocate an empty pixel vector with room for `len` pixels.
pub(crate) fn try_alloc_pixels(len: usize) -> RevealResult<Vec<u32>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    Ok(v)
}

fn pixel_count(width: u32, height: u32) -> RevealResult<usize> {
    if width == 0 || height == 0 {
        return Err(RevealError::validation(
            "pixel buffer dimensions must be non-zero",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| RevealError::validation("pixel buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
