use crate::foundation::core::{
    INITIAL_SAMPLING_STRIDE, MAX_BLUR_FRACTION_OF_HEIGHT, MAX_SUPPORTED_BLUR_PIXELS,
};
use crate::foundation::error::{RevealError, RevealResult};

/// The bits of the display a blur budget is derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisplayMetrics {
    /// Display height in physical pixels.
    pub height_px: u32,
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self { height_px: 1920 }
    }
}

/// Device-derived cap on blur radius.
///
/// `max_radius_px / sampling_stride` never exceeds [`MAX_SUPPORTED_BLUR_PIXELS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MaxBlurBudget {
    /// Power of two, starting at [`INITIAL_SAMPLING_STRIDE`].
    pub sampling_stride: u32,
    /// Largest blur radius in display pixels.
    pub max_radius_px: u32,
}

impl MaxBlurBudget {
    /// Derive the budget for a display using [`MAX_BLUR_FRACTION_OF_HEIGHT`].
    pub fn from_display(metrics: DisplayMetrics) -> RevealResult<Self> {
        Self::from_display_height_with_fraction(metrics.height_px, MAX_BLUR_FRACTION_OF_HEIGHT)
    }

    #[tracing::instrument]
    pub fn from_display_height_with_fraction(height_px: u32, fraction: f64) -> RevealResult<Self> {
        if height_px == 0 {
            return Err(RevealError::validation("display height must be > 0"));
        }
        if !fraction.is_finite() || fraction <= 0.0 {
            return Err(RevealError::validation("max blur fraction must be > 0"));
        }

        let max_radius_px = (f64::from(height_px) * fraction) as u32;
        let mut sampling_stride = INITIAL_SAMPLING_STRIDE;
        while max_radius_px / sampling_stride > MAX_SUPPORTED_BLUR_PIXELS {
            sampling_stride <<= 1;
        }

        let budget = Self {
            sampling_stride,
            max_radius_px,
        };
        tracing::debug!(
            sampling_stride,
            max_radius_px,
            max_prescaled = budget.max_prescaled_blur_pixels(),
            "derived blur budget"
        );
        Ok(budget)
    }

    /// Build a budget from explicit parts, checking the stride and the supported maximum.
    pub fn from_parts(sampling_stride: u32, max_radius_px: u32) -> RevealResult<Self> {
        if !sampling_stride.is_power_of_two() {
            return Err(RevealError::validation(
                "sampling stride must be a power of two",
            ));
        }
        if max_radius_px / sampling_stride > MAX_SUPPORTED_BLUR_PIXELS {
            return Err(RevealError::validation(format!(
                "max_radius_px / sampling_stride must be <= {MAX_SUPPORTED_BLUR_PIXELS}"
            )));
        }
        Ok(Self {
            sampling_stride,
            max_radius_px,
        })
    }

    /// Largest radius used in a ladder, in prescaled pixels. Never below 1, so a ladder is
    /// always buildable even on tiny displays.
    pub fn max_prescaled_blur_pixels(&self) -> u32 {
        (self.max_radius_px / self.sampling_stride).max(1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ladder/budget.rs"]
mod tests;
