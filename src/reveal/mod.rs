//! Reveal playback: the fade state machine, its tick scheduler and the host-facing view.

pub mod animator;
pub mod scheduler;
pub mod view;
