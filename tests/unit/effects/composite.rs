use super::*;

#[test]
fn clear_overlay_is_identity() {
    let p = Argb(0x8012_3456);
    assert_eq!(over_black(p, OverlayColor::clear()), p);
}

#[test]
fn opaque_pixel_is_darkened_and_stays_opaque() {
    let out = over_black(Argb(0xFFC8_6432), OverlayColor::new(125));
    assert_eq!(out.a(), 255);
    // 200 * 130 / 255, 100 * 130 / 255, 50 * 130 / 255
    assert_eq!((out.r(), out.g(), out.b()), (102, 51, 25));
}

#[test]
fn opaque_overlay_is_black() {
    let out = over_black(Argb(0xFFFF_FFFF), OverlayColor::new(255));
    assert_eq!(out, Argb(0xFF00_0000));
}

#[test]
fn transparent_pixel_takes_overlay() {
    let out = over_black(Argb(0x00FF_FFFF), OverlayColor::new(125));
    assert_eq!(out, Argb(0x7D00_0000));
}

#[test]
fn composite_leaves_source_untouched() {
    let frame = PixelBuffer::filled(3, 3, Argb(0xFF80_8080)).unwrap();
    let out = composite_overlay(&frame, OverlayColor::initial()).unwrap();
    assert_eq!(frame.pixel(0, 0), Some(Argb(0xFF80_8080)));
    assert!(out.pixel(1, 1).unwrap().r() < 0x80);
    assert!(out.same_dimensions(&frame));
}
