use std::time::Duration;

/// Single-threaded cooperative timer on a virtual clock.
///
/// Holds at most one pending tick. A tick is scheduled relative to the clock at the moment
/// the previous tick finished, so ticks can never overlap.
#[derive(Debug, Default)]
pub struct TickScheduler {
    now: Duration,
    pending: Option<Duration>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Due time of the pending tick, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// Schedule the next tick `delay` after now, replacing any pending one.
    pub fn schedule_after(&mut self, delay: Duration) {
        self.pending = Some(self.now.saturating_add(delay));
    }

    /// Drop the pending tick. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// If the pending tick is due at or before `until`, move the clock to its due time,
    /// clear it and return `true`.
    pub fn pop_due(&mut self, until: Duration) -> bool {
        match self.pending {
            Some(due) if due <= until => {
                self.now = self.now.max(due);
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Move the clock forward to `until` (never backwards).
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/scheduler.rs"]
mod tests;
