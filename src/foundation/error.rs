/// Convenience result type used across the crate.
pub type RevealResult<T> = Result<T, RevealError>;

/// Top-level error taxonomy for blurring, ladder building and playback.
#[derive(thiserror::Error, Debug)]
pub enum RevealError {
    /// A blur was requested with a radius outside `1..=MAX_FILTER_RADIUS`. No output is produced.
    #[error("invalid blur radius: {0} (must be within 1..=254)")]
    InvalidRadius(u32),

    /// Playback was requested before a frame ladder finished building.
    #[error("not ready: frame ladder has not been built")]
    NotReady,

    /// Playback was requested while a previous animation is still running.
    #[error("already playing: a reveal animation is in progress")]
    AlreadyPlaying,

    /// A pixel buffer could not be allocated.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// Invalid user-provided data (dimensions, pixel counts, frame counts).
    #[error("validation error: {0}")]
    Validation(String),

    /// A ladder build observed its cancel token and stopped early.
    #[error("cancelled: ladder build was superseded")]
    Cancelled,

    /// Image decode/encode failures.
    #[error("image error: {0}")]
    Image(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RevealError {
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// `true` for the non-fatal playback statuses a host is expected to ignore or retry.
    pub fn is_playback_status(&self) -> bool {
        matches!(self, Self::NotReady | Self::AlreadyPlaying)
    }
}

impl From<std::collections::TryReserveError> for RevealError {
    fn from(e: std::collections::TryReserveError) -> Self {
        Self::Allocation(e.to_string())
    }
}

impl From<image::ImageError> for RevealError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
