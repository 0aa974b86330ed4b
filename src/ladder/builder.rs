use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::animation::ease::Ease;
use crate::effects::stack_blur::stack_blur;
use crate::foundation::core::{KEY_FRAME_COUNT, PixelBuffer};
use crate::foundation::error::{RevealError, RevealResult};
use crate::ladder::budget::MaxBlurBudget;

/// Threading controls for ladder builds.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct LadderThreading {
    /// Blur ladder frames concurrently on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Cooperative cancellation flag shared between a build and whoever started it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Blur radii for one ladder, in build order (ascending blur).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LadderPlan {
    pub budget: MaxBlurBudget,
    pub ease: Ease,
    pub radii: Vec<u32>,
}

impl LadderPlan {
    /// Sample `ease` at `t = i / frame_count` for `i in 1..=frame_count` and scale by the
    /// budget's prescaled maximum. The last radius is always the maximum.
    pub fn new(budget: MaxBlurBudget, frame_count: u32, ease: Ease) -> RevealResult<Self> {
        if frame_count == 0 {
            return Err(RevealError::validation("ladder frame count must be >= 1"));
        }
        let max = f64::from(budget.max_prescaled_blur_pixels());
        let radii = (1..=frame_count)
            .map(|i| {
                let t = f64::from(i) / f64::from(frame_count);
                ((max * ease.apply(t)).round() as u32).max(1)
            })
            .collect();
        Ok(Self {
            budget,
            ease,
            radii,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.radii.len()
    }
}

/// One precomputed ladder frame.
#[derive(Clone, Debug)]
pub struct LadderFrame {
    pub radius: u32,
    pub image: PixelBuffer,
}

/// Precomputed blur frames for one source image. Index 0 is the most blurred frame and the
/// last index the least blurred one; the unblurred source is kept alongside as the fully
/// revealed frame.
#[derive(Clone, Debug)]
pub struct FrameLadder {
    source: PixelBuffer,
    frames: Vec<LadderFrame>,
}

impl FrameLadder {
    /// `frames` must be ordered most blurred first.
    pub fn new(source: PixelBuffer, frames: Vec<LadderFrame>) -> RevealResult<Self> {
        if frames.is_empty() {
            return Err(RevealError::validation("frame ladder must not be empty"));
        }
        if frames.iter().any(|f| !f.image.same_dimensions(&source)) {
            return Err(RevealError::validation(
                "ladder frames must match the source dimensions",
            ));
        }
        Ok(Self { source, frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LadderFrame> {
        self.frames.get(index)
    }

    /// Frame by blur level, where level `0` is the least blurred precomputed frame and
    /// level `len - 1` the most blurred.
    pub fn at_blur_level(&self, level: usize) -> Option<&PixelBuffer> {
        let index = self.frames.len().checked_sub(level + 1)?;
        self.frames.get(index).map(|f| &f.image)
    }

    pub fn most_blurred(&self) -> &PixelBuffer {
        &self.frames[0].image
    }

    pub fn least_blurred(&self) -> &PixelBuffer {
        &self.frames[self.frames.len() - 1].image
    }

    /// The unblurred image shown while the reveal holds.
    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    /// Radii in ladder order (most blurred first).
    pub fn radii(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.radius).collect()
    }
}

/// Builds frame ladders by running the stack blur once per planned radius.
#[derive(Clone, Debug, Default)]
pub struct FrameLadderBuilder {
    pub ease: Ease,
    pub threading: LadderThreading,
}

impl FrameLadderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threading(mut self, threading: LadderThreading) -> Self {
        self.threading = threading;
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn plan(&self, budget: MaxBlurBudget, frame_count: u32) -> RevealResult<LadderPlan> {
        LadderPlan::new(budget, frame_count, self.ease)
    }

    pub fn build(
        &self,
        source: PixelBuffer,
        budget: MaxBlurBudget,
        frame_count: u32,
    ) -> RevealResult<FrameLadder> {
        self.build_with_cancel(source, budget, frame_count, &CancelToken::new())
    }

    /// Build a ladder, checking `cancel` before each frame. Any failure aborts the whole
    /// build and drops the frames produced so far.
    #[tracing::instrument(
        skip(self, source, cancel),
        fields(width = source.width(), height = source.height())
    )]
    pub fn build_with_cancel(
        &self,
        source: PixelBuffer,
        budget: MaxBlurBudget,
        frame_count: u32,
        cancel: &CancelToken,
    ) -> RevealResult<FrameLadder> {
        let plan = self.plan(budget, frame_count)?;
        tracing::debug!(radii = ?plan.radii, parallel = self.threading.parallel, "building ladder");

        let blur_one = |radius: u32| -> RevealResult<LadderFrame> {
            if cancel.is_cancelled() {
                return Err(RevealError::Cancelled);
            }
            let image = stack_blur(&source, radius)?;
            Ok(LadderFrame { radius, image })
        };

        let mut built = if self.threading.parallel {
            let pool = build_thread_pool(self.threading.threads)?;
            pool.install(|| {
                plan.radii
                    .par_iter()
                    .map(|&r| blur_one(r))
                    .collect::<RevealResult<Vec<_>>>()
            })?
        } else {
            plan.radii
                .iter()
                .map(|&r| blur_one(r))
                .collect::<RevealResult<Vec<_>>>()?
        };

        if cancel.is_cancelled() {
            return Err(RevealError::Cancelled);
        }

        // Built in ascending blur; the ladder keeps the most blurred frame first.
        built.reverse();
        FrameLadder::new(source, built)
    }
}

/// Build the standard [`KEY_FRAME_COUNT`]-frame ladder for `source` with the default builder.
pub fn build_ladder(source: PixelBuffer, budget: MaxBlurBudget) -> RevealResult<FrameLadder> {
    FrameLadderBuilder::new().build(source, budget, KEY_FRAME_COUNT)
}

fn build_thread_pool(threads: Option<usize>) -> RevealResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(RevealError::validation(
            "ladder threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

#[cfg(test)]
#[path = "../../tests/unit/ladder/builder.rs"]
mod tests;
