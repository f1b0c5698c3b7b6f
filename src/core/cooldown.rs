//! Countdown primitive shared by every gated transition (attach/detach,
//! level exit, delayed cue sequences). Ticked once per frame, never blocking.

/// Counts down to zero; a transition guarded by a cooldown is only accepted
/// while `ready()` is true.
#[derive(Debug, Clone, Default)]
pub struct Cooldown {
    remaining: f32,
}

impl Cooldown {
    /// A cooldown that is already elapsed.
    pub fn idle() -> Self {
        Self { remaining: 0.0 }
    }

    /// A cooldown starting in its blocking window.
    pub fn armed(secs: f32) -> Self {
        Self {
            remaining: secs.max(0.0),
        }
    }

    /// Restart the blocking window.
    pub fn arm(&mut self, secs: f32) {
        self.remaining = secs.max(0.0);
    }

    pub fn tick(&mut self, dt: f32) {
        if dt > 0.0 && self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}
