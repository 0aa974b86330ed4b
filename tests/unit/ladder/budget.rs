use super::*;

#[test]
fn phone_height_keeps_initial_stride() {
    let b = MaxBlurBudget::from_display(DisplayMetrics { height_px: 1920 }).unwrap();
    assert_eq!(b.sampling_stride, 4);
    assert_eq!(b.max_radius_px, 76);
    assert_eq!(b.max_prescaled_blur_pixels(), 19);
}

#[test]
fn tall_display_doubles_stride_until_supported() {
    let b = MaxBlurBudget::from_display(DisplayMetrics { height_px: 8000 }).unwrap();
    assert_eq!(b.max_radius_px, 320);
    assert_eq!(b.sampling_stride, 8);
    assert_eq!(b.max_prescaled_blur_pixels(), 40);

    let b = MaxBlurBudget::from_display(DisplayMetrics { height_px: 20000 }).unwrap();
    assert_eq!(b.max_radius_px, 800);
    assert_eq!(b.sampling_stride, 32);
    assert!(b.max_prescaled_blur_pixels() <= MAX_SUPPORTED_BLUR_PIXELS);
}

#[test]
fn stride_is_always_a_power_of_two() {
    for h in [1, 10, 480, 1080, 2560, 4096, 10_000, 100_000] {
        let b = MaxBlurBudget::from_display(DisplayMetrics { height_px: h }).unwrap();
        assert!(b.sampling_stride.is_power_of_two());
        assert!(b.sampling_stride >= INITIAL_SAMPLING_STRIDE);
        assert!(b.max_radius_px / b.sampling_stride <= MAX_SUPPORTED_BLUR_PIXELS);
    }
}

#[test]
fn tiny_display_still_yields_a_usable_radius() {
    let b = MaxBlurBudget::from_display(DisplayMetrics { height_px: 10 }).unwrap();
    assert_eq!(b.max_radius_px, 0);
    assert_eq!(b.max_prescaled_blur_pixels(), 1);
}

#[test]
fn zero_height_is_rejected() {
    assert!(MaxBlurBudget::from_display(DisplayMetrics { height_px: 0 }).is_err());
    assert!(MaxBlurBudget::from_display_height_with_fraction(100, 0.0).is_err());
}

#[test]
fn from_parts_validates() {
    assert_eq!(
        MaxBlurBudget::from_parts(4, 40)
            .unwrap()
            .max_prescaled_blur_pixels(),
        10
    );
    assert!(MaxBlurBudget::from_parts(3, 40).is_err());
    assert!(MaxBlurBudget::from_parts(1, 41).is_err());
}
