use crate::foundation::core::{Argb, OverlayColor, PixelBuffer};
use crate::foundation::error::RevealResult;
use crate::foundation::math::{div255_round, mul_div255_u8};

/// Source-over of a black overlay onto one straight-alpha pixel.
pub fn over_black(dst: Argb, overlay: OverlayColor) -> Argb {
    let sa = u16::from(overlay.alpha);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let da = u16::from(dst.a());
    let out_a = sa + u16::from(mul_div255_u8(da, inv));

    let channel = |c: u8| {
        let premul = mul_div255_u8(u16::from(c), da);
        let darkened = mul_div255_u8(u16::from(premul), inv);
        div255_round(u16::from(darkened), out_a)
    };
    Argb::from_channels(out_a as u8, channel(dst.r()), channel(dst.g()), channel(dst.b()))
}

/// Darken `frame` in place with the overlay paint.
pub fn overlay_in_place(frame: &mut PixelBuffer, overlay: OverlayColor) {
    if overlay.alpha == 0 {
        return;
    }
    for p in frame.pixels_mut() {
        *p = over_black(Argb(*p), overlay).0;
    }
}

/// What a host surface shows for a presented `(frame, overlay)` pair.
pub fn composite_overlay(frame: &PixelBuffer, overlay: OverlayColor) -> RevealResult<PixelBuffer> {
    let mut out = frame.try_clone()?;
    overlay_in_place(&mut out, overlay);
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
