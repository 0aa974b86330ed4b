//! CPU stack-blur "de-blur" reveals.
//!
//! A subject image is blurred once per radius of a small eased ladder, off the interactive
//! path. The ladder is then played back on a cooperative timer, blurred to sharp and back,
//! with a darkening overlay fading alongside:
//!
//! - [`stack_blur`] filters one [`PixelBuffer`]
//! - [`FrameLadderBuilder`] derives radii from a [`MaxBlurBudget`] and builds a [`FrameLadder`]
//! - [`RevealAnimator`] is the fade-in / hold / fade-out state machine
//! - [`RevealView`] ties them together and pushes frames to a [`DisplaySink`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod effects;
pub mod foundation;
pub mod ladder;
pub mod reveal;
pub mod source;

pub use crate::animation::ease::Ease;
pub use crate::effects::composite::{composite_overlay, over_black, overlay_in_place};
pub use crate::effects::stack_blur::{DivTable, MAX_FILTER_RADIUS, div_table, stack_blur};
pub use crate::foundation::core::{
    Argb, DEFAULT_HOLD, INITIAL_OVERLAY_ALPHA, INITIAL_SAMPLING_STRIDE, KEY_FRAME_COUNT,
    MAX_BLUR_FRACTION_OF_HEIGHT, MAX_SUPPORTED_BLUR_PIXELS, OverlayColor, PixelBuffer,
    TICK_PERIOD,
};
pub use crate::foundation::error::{RevealError, RevealResult};
pub use crate::ladder::budget::{DisplayMetrics, MaxBlurBudget};
pub use crate::ladder::builder::{
    CancelToken, FrameLadder, FrameLadderBuilder, LadderFrame, LadderPlan, LadderThreading,
    build_ladder,
};
pub use crate::reveal::animator::{
    AnimationPhase, AnimationState, FrameRef, Presentation, RevealAnimator, TickOutcome,
};
pub use crate::reveal::scheduler::TickScheduler;
pub use crate::reveal::view::{BuildStatus, DisplaySink, Presented, RecordingSink, RevealView};
pub use crate::source::decode::{SourceOpts, load_source, load_source_from_memory};
