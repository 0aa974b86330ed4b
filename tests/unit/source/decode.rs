use super::*;

fn png_bytes(img: &image::RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

#[test]
fn decodes_png_pixels_as_argb() {
    let img = image::RgbaImage::from_pixel(6, 4, image::Rgba([10, 20, 30, 200]));
    let buf = load_source_from_memory(&png_bytes(&img), &SourceOpts::default()).unwrap();
    assert_eq!((buf.width(), buf.height()), (6, 4));
    assert!(buf.pixels().iter().all(|&p| p == 0xC80A_141E));
}

#[test]
fn long_side_is_limited_keeping_aspect() {
    let img = image::RgbaImage::from_pixel(200, 100, image::Rgba([0, 0, 0, 255]));
    let opts = SourceOpts {
        max_long_side: Some(50),
        ..SourceOpts::default()
    };
    let buf = load_source_from_memory(&png_bytes(&img), &opts).unwrap();
    assert_eq!((buf.width(), buf.height()), (50, 25));
}

#[test]
fn small_images_are_not_upscaled() {
    let img = image::RgbaImage::from_pixel(20, 10, image::Rgba([0, 0, 0, 255]));
    let opts = SourceOpts {
        max_long_side: Some(64),
        ..SourceOpts::default()
    };
    let buf = load_source_from_memory(&png_bytes(&img), &opts).unwrap();
    assert_eq!((buf.width(), buf.height()), (20, 10));
}

#[test]
fn garbage_bytes_are_an_error() {
    assert!(load_source_from_memory(b"not an image", &SourceOpts::default()).is_err());
}

#[test]
fn zero_long_side_is_rejected() {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
    let opts = SourceOpts {
        max_long_side: Some(0),
        ..SourceOpts::default()
    };
    let err = load_source_from_memory(&png_bytes(&img), &opts).unwrap_err();
    assert!(matches!(err, RevealError::Validation(_)));
}

#[test]
fn missing_file_reports_path() {
    let err = load_source(Path::new("/definitely/missing.png"), &SourceOpts::default())
        .unwrap_err();
    assert!(err.to_string().contains("missing.png"));
}
