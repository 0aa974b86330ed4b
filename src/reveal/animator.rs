use std::time::Duration;

use crate::foundation::core::{DEFAULT_HOLD, INITIAL_OVERLAY_ALPHA, OverlayColor, TICK_PERIOD};
use crate::foundation::error::{RevealError, RevealResult};

/// Playback phase of a reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    /// Cursor counts down from the frame count; `-1` ends the fade-in.
    FadingIn(i32),
    Holding,
    /// Cursor counts up from `0`; reaching the frame count ends the fade-out.
    FadingOut(u32),
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationState {
    pub phase: AnimationPhase,
    pub overlay_alpha: u8,
}

impl AnimationState {
    fn idle() -> Self {
        Self {
            phase: AnimationPhase::Idle,
            overlay_alpha: INITIAL_OVERLAY_ALPHA,
        }
    }
}

/// Which image a tick wants on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRef {
    /// Ladder frame by blur level (`0` = least blurred precomputed frame).
    Level(usize),
    /// The unblurred source image.
    Source,
}

/// A frame/overlay change that must be followed by a redraw. `frame: None` keeps the
/// currently displayed image and only changes the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Presentation {
    pub frame: Option<FrameRef>,
    pub overlay: OverlayColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    pub presentation: Option<Presentation>,
    /// Delay until the next tick, measured from the end of this one.
    pub next: Option<Duration>,
}

impl TickOutcome {
    fn nothing() -> Self {
        Self {
            presentation: None,
            next: None,
        }
    }
}

/// Fade-in / hold / fade-out state machine over a ladder of `frame_count` frames.
///
/// The animator is purely reactive: [`RevealAnimator::tick`] performs one step and reports
/// what to show and when to call it again. Timing lives in the caller's scheduler.
#[derive(Debug)]
pub struct RevealAnimator {
    frame_count: u32,
    prepared: bool,
    hold: Duration,
    state: AnimationState,
}

impl RevealAnimator {
    pub fn new(frame_count: u32) -> Self {
        Self {
            frame_count: frame_count.max(1),
            prepared: false,
            hold: DEFAULT_HOLD,
            state: AnimationState::idle(),
        }
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn is_playing(&self) -> bool {
        !matches!(
            self.state.phase,
            AnimationPhase::Idle | AnimationPhase::Done
        )
    }

    /// Alpha step between consecutive ladder frames.
    pub fn progress_alpha(&self) -> u8 {
        (u32::from(INITIAL_OVERLAY_ALPHA) / self.frame_count) as u8
    }

    /// Mark whether a ladder is available. Clearing it also aborts any running animation.
    pub fn set_prepared(&mut self, prepared: bool) {
        self.prepared = prepared;
        if !prepared {
            self.reset();
        }
    }

    /// Back to `Idle` with the initial overlay.
    pub fn reset(&mut self) {
        if self.is_playing() {
            tracing::debug!(phase = ?self.state.phase, "reveal animation aborted");
        }
        self.state = AnimationState::idle();
    }

    /// Start a reveal. A non-positive `hold_ms` selects [`DEFAULT_HOLD`]. On success the
    /// first tick should run immediately.
    pub fn try_play(&mut self, hold_ms: i32) -> RevealResult<()> {
        if !self.prepared {
            return Err(RevealError::NotReady);
        }
        if self.is_playing() {
            return Err(RevealError::AlreadyPlaying);
        }

        self.hold = if hold_ms <= 0 {
            DEFAULT_HOLD
        } else {
            Duration::from_millis(hold_ms as u64)
        };
        self.state = AnimationState {
            phase: AnimationPhase::FadingIn(self.frame_count as i32),
            overlay_alpha: INITIAL_OVERLAY_ALPHA,
        };
        tracing::debug!(hold_ms = self.hold.as_millis() as u64, "reveal animation started");
        Ok(())
    }

    /// Boolean form of [`RevealAnimator::try_play`] for hosts.
    pub fn play_animation(&mut self, hold_ms: i32) -> bool {
        self.try_play(hold_ms).is_ok()
    }

    /// Run one step of the state machine.
    pub fn tick(&mut self) -> TickOutcome {
        match self.state.phase {
            AnimationPhase::Idle | AnimationPhase::Done => TickOutcome::nothing(),
            AnimationPhase::FadingIn(cursor) => self.fade_in_step(cursor - 1),
            AnimationPhase::Holding => {
                tracing::debug!("hold elapsed, fading out");
                self.fade_out_step(0)
            }
            AnimationPhase::FadingOut(cursor) => self.fade_out_step(cursor),
        }
    }

    fn fade_in_step(&mut self, cursor: i32) -> TickOutcome {
        tracing::trace!(cursor, "fade-in tick");
        if cursor >= 0 {
            let steps = self.frame_count - cursor as u32;
            let alpha = u32::from(INITIAL_OVERLAY_ALPHA)
                .saturating_sub(u32::from(self.progress_alpha()) * steps);
            self.state = AnimationState {
                phase: AnimationPhase::FadingIn(cursor),
                overlay_alpha: alpha as u8,
            };
            return self.emit(Some(FrameRef::Level(cursor as usize)), Some(TICK_PERIOD));
        }

        tracing::debug!("fade-in complete, holding");
        self.state = AnimationState {
            phase: AnimationPhase::Holding,
            overlay_alpha: 0,
        };
        self.emit(Some(FrameRef::Source), Some(self.hold))
    }

    fn fade_out_step(&mut self, cursor: u32) -> TickOutcome {
        tracing::trace!(cursor, "fade-out tick");
        if cursor < self.frame_count {
            self.state = AnimationState {
                phase: AnimationPhase::FadingOut(cursor + 1),
                overlay_alpha: (u32::from(self.progress_alpha()) * cursor) as u8,
            };
            return self.emit(Some(FrameRef::Level(cursor as usize)), Some(TICK_PERIOD));
        }

        tracing::debug!("reveal animation done");
        self.state = AnimationState {
            phase: AnimationPhase::Done,
            overlay_alpha: INITIAL_OVERLAY_ALPHA,
        };
        self.emit(None, None)
    }

    fn emit(&self, frame: Option<FrameRef>, next: Option<Duration>) -> TickOutcome {
        TickOutcome {
            presentation: Some(Presentation {
                frame,
                overlay: OverlayColor::new(self.state.overlay_alpha),
            }),
            next,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/animator.rs"]
mod tests;
