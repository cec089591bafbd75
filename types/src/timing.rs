//! Frame-delta timers shared by the interaction state machines.
//!
//! Every animated piece of Recall is advanced from the frame loop with a
//! measured delta rather than scheduled callbacks, so a pause or reset can
//! never race a stale timer firing.

use std::time::Duration;

#[must_use]
pub fn normalized_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }

    let elapsed = elapsed.as_secs_f32();
    let total = duration.as_secs_f32();
    (elapsed / total).clamp(0.0, 1.0)
}

/// Ease-out interpolation, used for return-to-origin animations.
#[must_use]
pub fn ease_out(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p) * (1.0 - p)
}

/// A one-shot timer driven by `advance(delta)` calls.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    elapsed: Duration,
    duration: Duration,
}

impl PhaseTimer {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Advance by a frame delta. Saturates; never wraps.
    pub fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }

    /// Progress in `[0.0, 1.0]`. A zero-duration timer is always complete.
    #[must_use]
    pub fn progress(&self) -> f32 {
        normalized_progress(self.elapsed, self.duration)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Time left until the timer fires.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }

    /// Elapsed time beyond the duration, for carrying overshoot into a
    /// follow-up phase.
    #[must_use]
    pub fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::{PhaseTimer, ease_out, normalized_progress};
    use std::time::Duration;

    #[test]
    fn zero_duration_is_immediately_finished() {
        let timer = PhaseTimer::new(Duration::ZERO);
        assert!(timer.is_finished());
        assert!((timer.progress() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn advance_accumulates_until_finished() {
        let mut timer = PhaseTimer::new(Duration::from_millis(100));
        timer.advance(Duration::from_millis(40));
        assert!(!timer.is_finished());
        timer.advance(Duration::from_millis(60));
        assert!(timer.is_finished());
    }

    #[test]
    fn progress_clamps_at_one() {
        let mut timer = PhaseTimer::new(Duration::from_millis(10));
        timer.advance(Duration::from_secs(5));
        assert!((timer.progress() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn overshoot_reports_excess() {
        let mut timer = PhaseTimer::new(Duration::from_millis(100));
        timer.advance(Duration::from_millis(130));
        assert_eq!(timer.overshoot(), Duration::from_millis(30));
    }

    #[test]
    fn remaining_counts_down() {
        let mut timer = PhaseTimer::new(Duration::from_millis(100));
        assert_eq!(timer.remaining(), Duration::from_millis(100));
        timer.advance(Duration::from_millis(70));
        assert_eq!(timer.remaining(), Duration::from_millis(30));
    }

    #[test]
    fn normalized_progress_midpoint() {
        let p = normalized_progress(Duration::from_millis(50), Duration::from_millis(100));
        assert!((p - 0.5).abs() < 0.001);
    }

    #[test]
    fn ease_out_endpoints() {
        assert!((ease_out(0.0)).abs() < f32::EPSILON);
        assert!((ease_out(1.0) - 1.0).abs() < f32::EPSILON);
        assert!(ease_out(0.5) > 0.5, "ease-out front-loads movement");
    }
}
