use super::*;
use crate::foundation::core::KEY_FRAME_COUNT;

fn prepared() -> RevealAnimator {
    let mut a = RevealAnimator::new(KEY_FRAME_COUNT);
    a.set_prepared(true);
    a
}

fn shown(outcome: &TickOutcome) -> (Option<FrameRef>, u8) {
    let p = outcome.presentation.expect("tick should present");
    (p.frame, p.overlay.alpha)
}

#[test]
fn play_before_prepared_is_rejected() {
    let mut a = RevealAnimator::new(KEY_FRAME_COUNT);
    assert!(matches!(a.try_play(-1), Err(RevealError::NotReady)));
    assert!(!a.play_animation(-1));
    assert_eq!(a.state().phase, AnimationPhase::Idle);
}

#[test]
fn second_play_is_rejected_without_changing_state() {
    let mut a = prepared();
    assert!(a.play_animation(300));
    let before = a.state();
    assert!(matches!(a.try_play(900), Err(RevealError::AlreadyPlaying)));
    assert!(!a.play_animation(900));
    assert_eq!(a.state(), before);
    assert_eq!(a.hold(), Duration::from_millis(300));
}

#[test]
fn non_positive_hold_uses_default() {
    for hold in [-1, 0] {
        let mut a = prepared();
        assert!(a.play_animation(hold));
        assert_eq!(a.hold(), DEFAULT_HOLD);
    }
    let mut a = prepared();
    assert!(a.play_animation(750));
    assert_eq!(a.hold(), Duration::from_millis(750));
}

#[test]
fn fade_in_takes_six_ticks_before_holding() {
    let mut a = prepared();
    assert!(a.play_animation(-1));

    let expected = [(4, 100), (3, 75), (2, 50), (1, 25), (0, 0)];
    for (level, alpha) in expected {
        let out = a.tick();
        assert_eq!(shown(&out), (Some(FrameRef::Level(level)), alpha));
        assert_eq!(out.next, Some(TICK_PERIOD));
        assert_eq!(a.state().phase, AnimationPhase::FadingIn(level as i32));
    }

    let out = a.tick();
    assert_eq!(shown(&out), (Some(FrameRef::Source), 0));
    assert_eq!(out.next, Some(DEFAULT_HOLD));
    assert_eq!(a.state().phase, AnimationPhase::Holding);
    assert!(a.is_playing());
}

#[test]
fn fade_out_presents_five_frames_then_restores_overlay() {
    let mut a = prepared();
    assert!(a.play_animation(-1));
    for _ in 0..6 {
        a.tick();
    }

    let expected = [(0, 0), (1, 25), (2, 50), (3, 75), (4, 100)];
    for (level, alpha) in expected {
        let out = a.tick();
        assert_eq!(shown(&out), (Some(FrameRef::Level(level)), alpha));
        assert_eq!(out.next, Some(TICK_PERIOD));
    }

    let out = a.tick();
    assert_eq!(shown(&out), (None, INITIAL_OVERLAY_ALPHA));
    assert_eq!(out.next, None);
    assert_eq!(a.state().phase, AnimationPhase::Done);
    assert!(!a.is_playing());

    // A finished reveal can be replayed.
    assert!(a.play_animation(-1));
}

#[test]
fn idle_tick_does_nothing() {
    let mut a = prepared();
    assert_eq!(a.tick(), TickOutcome::nothing());
}

#[test]
fn unpreparing_aborts_playback() {
    let mut a = prepared();
    assert!(a.play_animation(-1));
    a.tick();
    a.set_prepared(false);
    assert_eq!(a.state().phase, AnimationPhase::Idle);
    assert_eq!(a.state().overlay_alpha, INITIAL_OVERLAY_ALPHA);
    assert_eq!(a.tick(), TickOutcome::nothing());
}

#[test]
fn progress_alpha_divides_initial_alpha() {
    assert_eq!(prepared().progress_alpha(), 25);
    let mut a = RevealAnimator::new(3);
    a.set_prepared(true);
    assert_eq!(a.progress_alpha(), 41);
    assert!(a.play_animation(-1));
    let alphas: Vec<u8> = (0..3).map(|_| shown(&a.tick()).1).collect();
    assert_eq!(alphas, vec![84, 43, 2]);
}
