use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::foundation::core::{PixelBuffer, try_alloc_pixels};
use crate::foundation::error::{RevealError, RevealResult};

/// Largest radius the filter accepts. Keeps the division table (`256 * (r + 1)^2` bytes)
/// and the `i32` running sums bounded.
pub const MAX_FILTER_RADIUS: u32 = 254;

/// Lookup table mapping a triangular-weighted channel sum to its normalized value.
///
/// `table[s] == s / divsum` (integer floor) for every `s < 256 * divsum`, where
/// `divsum = (radius + 1)^2` is the total kernel weight.
#[derive(Debug)]
pub struct DivTable {
    radius: u32,
    divsum: u32,
    table: Box<[u8]>,
}

impl DivTable {
    fn new(radius: u32) -> RevealResult<Self> {
        let div = 2 * radius + 1;
        let divsum = ((div + 1) >> 1).pow(2);
        let len = 256usize * divsum as usize;
        let mut table = Vec::new();
        table.try_reserve_exact(len)?;
        table.extend((0..len).map(|s| (s / divsum as usize) as u8));
        Ok(Self {
            radius,
            divsum,
            table: table.into_boxed_slice(),
        })
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn divsum(&self) -> u32 {
        self.divsum
    }

    #[inline]
    fn get(&self, sum: i32) -> u32 {
        u32::from(self.table[sum as usize])
    }
}

/// Shared, immutable division table for `radius`, built on first use.
pub fn div_table(radius: u32) -> RevealResult<Arc<DivTable>> {
    static CACHE: OnceLock<Mutex<HashMap<u32, Arc<DivTable>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(t) = lock_cache(cache).get(&radius) {
        return Ok(Arc::clone(t));
    }

    // Built outside the lock so blurs with other radii are not serialized behind us.
    let built = Arc::new(DivTable::new(radius)?);
    let mut guard = lock_cache(cache);
    Ok(Arc::clone(guard.entry(radius).or_insert(built)))
}

fn lock_cache<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // The table map is never left half-written, so a poisoned lock is still usable.
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Stack blur (Mario Klingemann's algorithm): a two-pass separable sliding window with
/// triangular weights `radius + 1 - |offset|` and edge-clamped sampling.
///
/// Only the RGB channels are filtered; every output pixel keeps its source alpha verbatim.
/// Cost is `O(width * height)` regardless of radius. The input is never modified.
#[tracing::instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn stack_blur(src: &PixelBuffer, radius: u32) -> RevealResult<PixelBuffer> {
    if !(1..=MAX_FILTER_RADIUS).contains(&radius) {
        return Err(RevealError::InvalidRadius(radius));
    }

    let dv = div_table(radius)?;
    let w = src.width() as usize;
    let h = src.height() as usize;
    let len = w * h;

    let mut red = try_alloc_channel(len)?;
    let mut green = try_alloc_channel(len)?;
    let mut blue = try_alloc_channel(len)?;
    horizontal_pass(src.pixels(), w, h, radius, &dv, &mut red, &mut green, &mut blue);

    let mut out = try_alloc_pixels(len)?;
    out.extend_from_slice(src.pixels());
    vertical_pass(&mut out, w, h, radius, &dv, &red, &green, &blue);

    PixelBuffer::new(src.width(), src.height(), out)
}

fn try_alloc_channel(len: usize) -> RevealResult<Vec<u8>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, 0);
    Ok(v)
}

/// Running sums for one scan line. `sum` is the weighted window total; `in_sum` holds the
/// entries right of center (rising weight as the window advances) and `out_sum` the
/// entries at or left of center (falling weight).
#[derive(Default)]
struct Window {
    sum: [i32; 3],
    in_sum: [i32; 3],
    out_sum: [i32; 3],
}

impl Window {
    fn seed(&mut self, rgb: [i32; 3], offset: i32, radius: i32) {
        let weight = radius + 1 - offset.abs();
        for c in 0..3 {
            self.sum[c] += rgb[c] * weight;
            if offset > 0 {
                self.in_sum[c] += rgb[c];
            } else {
                self.out_sum[c] += rgb[c];
            }
        }
    }

    /// Slide by one sample: drop `leaving` (the oldest stack entry, replaced in place by
    /// `incoming`), then move the new center `center` from the in-half to the out-half.
    fn advance(&mut self, stack: &mut [[i32; 3]], start: usize, center: usize, incoming: [i32; 3]) {
        for c in 0..3 {
            self.sum[c] -= self.out_sum[c];
            self.out_sum[c] -= stack[start][c];
        }
        stack[start] = incoming;
        for c in 0..3 {
            self.in_sum[c] += incoming[c];
            self.sum[c] += self.in_sum[c];
        }
        let mid = stack[center];
        for c in 0..3 {
            self.out_sum[c] += mid[c];
            self.in_sum[c] -= mid[c];
        }
    }
}

#[inline]
fn rgb_of(p: u32) -> [i32; 3] {
    [
        ((p >> 16) & 0xff) as i32,
        ((p >> 8) & 0xff) as i32,
        (p & 0xff) as i32,
    ]
}

#[allow(clippy::too_many_arguments)]
fn horizontal_pass(
    pix: &[u32],
    w: usize,
    h: usize,
    radius: u32,
    dv: &DivTable,
    red: &mut [u8],
    green: &mut [u8],
    blue: &mut [u8],
) {
    let r = radius as i32;
    let div = 2 * radius as usize + 1;
    let wm = w as i32 - 1;
    let mut stack = vec![[0i32; 3]; div];

    for y in 0..h {
        let row = y * w;
        let mut win = Window::default();
        for i in -r..=r {
            let rgb = rgb_of(pix[row + i.clamp(0, wm) as usize]);
            stack[(i + r) as usize] = rgb;
            win.seed(rgb, i, r);
        }

        let mut sp = radius as usize;
        for x in 0..w {
            red[row + x] = dv.get(win.sum[0]) as u8;
            green[row + x] = dv.get(win.sum[1]) as u8;
            blue[row + x] = dv.get(win.sum[2]) as u8;

            let start = (sp + div - radius as usize) % div;
            let next = (x as i32 + r + 1).min(wm) as usize;
            sp = (sp + 1) % div;
            win.advance(&mut stack, start, sp, rgb_of(pix[row + next]));
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn vertical_pass(
    out: &mut [u32],
    w: usize,
    h: usize,
    radius: u32,
    dv: &DivTable,
    red: &[u8],
    green: &[u8],
    blue: &[u8],
) {
    let r = radius as i32;
    let div = 2 * radius as usize + 1;
    let hm = h as i32 - 1;
    let mut stack = vec![[0i32; 3]; div];
    let sample = |idx: usize| {
        [
            i32::from(red[idx]),
            i32::from(green[idx]),
            i32::from(blue[idx]),
        ]
    };

    for x in 0..w {
        let mut win = Window::default();
        for i in -r..=r {
            let rgb = sample(i.clamp(0, hm) as usize * w + x);
            stack[(i + r) as usize] = rgb;
            win.seed(rgb, i, r);
        }

        let mut sp = radius as usize;
        for y in 0..h {
            let idx = y * w + x;
            out[idx] = (out[idx] & 0xff00_0000)
                | (dv.get(win.sum[0]) << 16)
                | (dv.get(win.sum[1]) << 8)
                | dv.get(win.sum[2]);

            let start = (sp + div - radius as usize) % div;
            let next = (y as i32 + r + 1).min(hm) as usize;
            sp = (sp + 1) % div;
            win.advance(&mut stack, start, sp, sample(next * w + x));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/stack_blur.rs"]
mod tests;
