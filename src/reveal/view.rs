use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use crate::foundation::core::{KEY_FRAME_COUNT, OverlayColor, PixelBuffer};
use crate::foundation::error::{RevealError, RevealResult};
use crate::ladder::budget::{DisplayMetrics, MaxBlurBudget};
use crate::ladder::builder::{CancelToken, FrameLadder, FrameLadderBuilder};
use crate::reveal::animator::{FrameRef, RevealAnimator};
use crate::reveal::scheduler::TickScheduler;

/// Host surface receiving frames. Every call is a redraw request.
pub trait DisplaySink {
    /// Show `frame` with a black overlay of `overlay.alpha` painted on top.
    /// `at` is the scheduler's virtual time.
    fn present(&mut self, frame: &PixelBuffer, overlay: OverlayColor, at: Duration);

    /// A new ladder is in place; `placeholder` is its most blurred frame.
    fn on_ready(&mut self, placeholder: &PixelBuffer) {
        let _ = placeholder;
    }
}

/// One captured [`DisplaySink::present`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presented {
    pub frame: PixelBuffer,
    pub overlay: OverlayColor,
    pub at: Duration,
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub presented: Vec<Presented>,
    pub ready: Vec<PixelBuffer>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for RecordingSink {
    fn present(&mut self, frame: &PixelBuffer, overlay: OverlayColor, at: Duration) {
        self.presented.push(Presented {
            frame: frame.clone(),
            overlay,
            at,
        });
    }

    fn on_ready(&mut self, placeholder: &PixelBuffer) {
        self.ready.push(placeholder.clone());
    }
}

/// Result of polling an in-flight ladder build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStatus {
    /// No source image has been set.
    Empty,
    /// A build is still running.
    Building,
    /// A ladder is in place and playback may start.
    Ready,
}

type SpawnWorker = fn(String, Box<dyn FnOnce() + Send>) -> std::io::Result<()>;

fn spawn_named(name: String, work: Box<dyn FnOnce() + Send>) -> std::io::Result<()> {
    std::thread::Builder::new().name(name).spawn(work).map(|_| ())
}

struct PendingBuild {
    generation: u64,
    cancel: CancelToken,
    rx: Receiver<RevealResult<FrameLadder>>,
}

impl Drop for PendingBuild {
    // A build nobody waits for any more should stop at its next frame boundary.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Owns the subject image, its frame ladder and the reveal animation, and pushes frames to a
/// [`DisplaySink`].
///
/// Ladder builds run on a worker thread and are swapped in by [`RevealView::pump`]. Ticks run
/// cooperatively on a virtual clock advanced by [`RevealView::advance`].
pub struct RevealView<S: DisplaySink> {
    sink: S,
    builder: FrameLadderBuilder,
    budget: MaxBlurBudget,
    ladder: Option<FrameLadder>,
    subject: Option<u64>,
    pending: Option<PendingBuild>,
    generation: u64,
    animator: RevealAnimator,
    scheduler: TickScheduler,
    current: Option<FrameRef>,
    overlay: OverlayColor,
    spawn: SpawnWorker,
}

impl<S: DisplaySink> RevealView<S> {
    pub fn new(sink: S, budget: MaxBlurBudget) -> Self {
        Self {
            sink,
            builder: FrameLadderBuilder::new(),
            budget,
            ladder: None,
            subject: None,
            pending: None,
            generation: 0,
            animator: RevealAnimator::new(KEY_FRAME_COUNT),
            scheduler: TickScheduler::new(),
            current: None,
            overlay: OverlayColor::initial(),
            spawn: spawn_named,
        }
    }

    /// Create a view whose blur budget is derived from the display.
    pub fn for_display(sink: S, metrics: DisplayMetrics) -> RevealResult<Self> {
        Ok(Self::new(sink, MaxBlurBudget::from_display(metrics)?))
    }

    pub fn with_builder(mut self, builder: FrameLadderBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Re-derive the budget, e.g. after a display change. Applies to the next build.
    pub fn recompute_budget(&mut self, metrics: DisplayMetrics) -> RevealResult<()> {
        self.budget = MaxBlurBudget::from_display(metrics)?;
        Ok(())
    }

    pub fn budget(&self) -> MaxBlurBudget {
        self.budget
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn animator(&self) -> &RevealAnimator {
        &self.animator
    }

    pub fn ladder(&self) -> Option<&FrameLadder> {
        self.ladder.as_ref()
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Incremented by every accepted [`RevealView::set_source_image`].
    pub fn build_generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> BuildStatus {
        if self.ladder.is_some() {
            BuildStatus::Ready
        } else if self.pending.is_some() {
            BuildStatus::Building
        } else {
            BuildStatus::Empty
        }
    }

    /// Replace the subject image. Stops any animation, releases the previous ladder, cancels
    /// an in-flight build and starts a new one on a worker thread. Setting the image that is
    /// already the subject is a no-op.
    pub fn set_source_image(&mut self, source: PixelBuffer) -> RevealResult<()> {
        let fingerprint = source.fingerprint();
        if self.subject == Some(fingerprint) {
            tracing::debug!("source image unchanged, keeping current ladder");
            return Ok(());
        }

        self.scheduler.cancel();
        self.animator.set_prepared(false);
        self.ladder = None;
        self.current = None;
        self.overlay = OverlayColor::initial();
        if let Some(stale) = self.pending.take() {
            tracing::debug!(generation = stale.generation, "cancelling stale ladder build");
        }

        // Only a started build owns the subject.
        self.subject = None;

        let generation = self.generation + 1;
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::channel();
        let builder = self.builder.clone();
        let budget = self.budget;
        let worker_cancel = cancel.clone();
        (self.spawn)(
            format!("ladder-build-{generation}"),
            Box::new(move || {
                let result =
                    builder.build_with_cancel(source, budget, KEY_FRAME_COUNT, &worker_cancel);
                // The receiver is gone when the build was superseded; dropping the result
                // releases its frames.
                let _ = tx.send(result);
            }),
        )
        .map_err(|e| RevealError::Other(anyhow::Error::new(e).context("spawn ladder worker")))?;

        self.generation = generation;
        self.subject = Some(fingerprint);
        self.pending = Some(PendingBuild {
            generation,
            cancel,
            rx,
        });
        Ok(())
    }

    /// Swap in a finished ladder, if any. Build failures are returned once and leave the view
    /// without a ladder.
    pub fn pump(&mut self) -> RevealResult<BuildStatus> {
        let Some(pending) = self.pending.as_ref() else {
            return Ok(self.status());
        };
        let received = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return Ok(BuildStatus::Building),
            Err(TryRecvError::Disconnected) => Err(worker_lost()),
        };
        self.finish_build(received)
    }

    /// Block until the in-flight build (if any) finishes, then swap it in.
    pub fn wait_until_ready(&mut self) -> RevealResult<BuildStatus> {
        let Some(pending) = self.pending.as_ref() else {
            return Ok(self.status());
        };
        let received = pending.rx.recv().unwrap_or_else(|_| Err(worker_lost()));
        self.finish_build(received)
    }

    fn finish_build(&mut self, received: RevealResult<FrameLadder>) -> RevealResult<BuildStatus> {
        let Some(pending) = self.pending.take() else {
            return Ok(self.status());
        };
        match received {
            Ok(ladder) => {
                tracing::debug!(
                    generation = pending.generation,
                    radii = ?ladder.radii(),
                    "ladder ready"
                );
                self.sink.on_ready(ladder.most_blurred());
                self.current = Some(FrameRef::Level(ladder.len() - 1));
                self.overlay = OverlayColor::initial();
                self.ladder = Some(ladder);
                self.animator.set_prepared(true);
                self.present_current();
                Ok(BuildStatus::Ready)
            }
            Err(e) => {
                tracing::warn!(generation = pending.generation, error = %e, "ladder build failed");
                self.subject = None;
                Err(e)
            }
        }
    }

    /// Start the reveal. Returns `false` when no ladder is ready or a reveal is running.
    pub fn play_animation(&mut self, hold_ms: i32) -> bool {
        self.try_play(hold_ms).is_ok()
    }

    pub fn try_play(&mut self, hold_ms: i32) -> RevealResult<()> {
        self.animator.try_play(hold_ms)?;
        self.scheduler.schedule_after(Duration::ZERO);
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.animator.is_playing()
    }

    /// Advance virtual time by `elapsed`: swap in a finished build, then run every tick that
    /// falls due, each at its own due time.
    pub fn advance(&mut self, elapsed: Duration) -> RevealResult<()> {
        self.pump()?;
        let until = self.scheduler.now().saturating_add(elapsed);
        while self.scheduler.pop_due(until) {
            self.run_tick();
        }
        self.scheduler.settle(until);
        Ok(())
    }

    /// Run pending ticks back to back until the animation stops scheduling. Returns the
    /// virtual time spent.
    pub fn run_to_completion(&mut self) -> Duration {
        let start = self.scheduler.now();
        while let Some(due) = self.scheduler.next_due() {
            if self.scheduler.pop_due(due) {
                self.run_tick();
            }
        }
        self.scheduler.now().saturating_sub(start)
    }

    fn run_tick(&mut self) {
        let outcome = self.animator.tick();
        if let Some(p) = outcome.presentation {
            let missing = p
                .frame
                .is_some_and(|f| self.ladder.as_ref().and_then(|l| resolve(l, f)).is_none());
            if missing {
                tracing::warn!(frame = ?p.frame, "ladder frame missing, skipping redraw");
            } else {
                if let Some(frame) = p.frame {
                    self.current = Some(frame);
                }
                self.overlay = p.overlay;
                self.present_current();
            }
        }
        if let Some(next) = outcome.next {
            self.scheduler.schedule_after(next);
        }
    }

    fn present_current(&mut self) {
        let at = self.scheduler.now();
        let Some(current) = self.current else {
            return;
        };
        let Some(ladder) = self.ladder.as_ref() else {
            return;
        };
        if let Some(frame) = resolve(ladder, current) {
            self.sink.present(frame, self.overlay, at);
        }
    }
}

fn resolve(ladder: &FrameLadder, frame: FrameRef) -> Option<&PixelBuffer> {
    match frame {
        FrameRef::Level(level) => ladder.at_blur_level(level),
        FrameRef::Source => Some(ladder.source()),
    }
}

fn worker_lost() -> RevealError {
    RevealError::Other(anyhow::anyhow!("ladder worker exited without a result"))
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/view.rs"]
mod tests;
