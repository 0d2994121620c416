use std::time::{Duration, Instant};

/// Countdown for a timed recording, evaluated against a caller-supplied clock.
///
/// The timer never reads the clock itself, so hosts that tick irregularly (or tests
/// that fake time) get consistent answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingTimer {
    deadline: Option<Instant>,
    duration: Duration,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false, leaving the timer disarmed, when `now + duration` is not a
    /// representable instant.
    pub fn arm(&mut self, now: Instant, duration: Duration) -> bool {
        let Some(deadline) = now.checked_add(duration) else {
            self.disarm();
            return false;
        };
        self.deadline = Some(deadline);
        self.duration = duration;
        true
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
        self.duration = Duration::ZERO;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline
            .map(|d| d.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        if self.deadline.is_none() {
            return Duration::ZERO;
        }
        self.duration.saturating_sub(self.remaining(now))
    }

    /// Fraction of the armed duration that has passed, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.deadline.is_none() {
            return 0.0;
        }
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}
