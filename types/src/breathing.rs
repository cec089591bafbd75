//! Breathing-cycle meditation timer.
//!
//! A ticker-driven phase machine: Breathe In -> Hold -> Breathe Out -> a
//! trailing half-length pause, looping while running. The elapsed-seconds
//! counter accumulates independently of the phase sequence. Pause and reset
//! bump a generation counter so async completions started under an older
//! session can be detected and dropped (guard-then-apply).

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Length of each displayed breathing phase.
pub const PHASE_DURATION: Duration = Duration::from_millis(4000);
/// Pause before the cycle loops; half a phase, not separately displayed.
pub const TRAILING_PAUSE: Duration = Duration::from_millis(2000);

/// Phase label shown to the user. `Begin` is the idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Begin,
    BreatheIn,
    Hold,
    BreatheOut,
}

impl BreathPhase {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Begin => "Begin",
            Self::BreatheIn => "Breathe In",
            Self::Hold => "Hold",
            Self::BreatheOut => "Breathe Out",
        }
    }
}

/// Internal cycle segment; the trailing pause displays as `BreatheOut` but
/// animates differently (circle rests contracted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathSegment {
    In,
    HoldTop,
    Out,
    HoldBottom,
}

impl BreathSegment {
    const CYCLE: [Self; 4] = [Self::In, Self::HoldTop, Self::Out, Self::HoldBottom];

    #[must_use]
    fn duration(self) -> Duration {
        match self {
            Self::In | Self::HoldTop | Self::Out => PHASE_DURATION,
            Self::HoldBottom => TRAILING_PAUSE,
        }
    }

    #[must_use]
    pub fn phase(self) -> BreathPhase {
        match self {
            Self::In => BreathPhase::BreatheIn,
            Self::HoldTop => BreathPhase::Hold,
            Self::Out | Self::HoldBottom => BreathPhase::BreatheOut,
        }
    }
}

/// The meditation session state machine.
#[derive(Debug, Clone)]
pub struct BreathingTimer {
    running: bool,
    segment: usize,
    segment_elapsed: Duration,
    elapsed: Duration,
    started_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl Default for BreathingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathingTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            running: false,
            segment: 0,
            segment_elapsed: Duration::ZERO,
            elapsed: Duration::ZERO,
            started_at: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Displayed phase. `Begin` whenever the timer is not running.
    #[must_use]
    pub fn phase(&self) -> BreathPhase {
        if self.running {
            BreathSegment::CYCLE[self.segment].phase()
        } else {
            BreathPhase::Begin
        }
    }

    /// Internal segment, for animation; `None` while idle.
    #[must_use]
    pub fn segment(&self) -> Option<BreathSegment> {
        self.running.then(|| BreathSegment::CYCLE[self.segment])
    }

    /// Progress through the current segment in `[0.0, 1.0]`.
    #[must_use]
    pub fn segment_progress(&self) -> f32 {
        if !self.running {
            return 0.0;
        }
        crate::timing::normalized_progress(
            self.segment_elapsed,
            BreathSegment::CYCLE[self.segment].duration(),
        )
    }

    /// Whole seconds accumulated while running. Survives pause; only an
    /// explicit reset zeroes it.
    #[must_use]
    pub fn seconds(&self) -> u64 {
        self.elapsed.as_secs()
    }

    /// Wall-clock start of the session; cleared on reset, kept across pause.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Monotonic counter bumped on pause and reset. Async work captures it
    /// at spawn time and is dropped on completion if it no longer matches.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A session save is meaningful once at least one second accumulated.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.seconds() > 0
    }

    /// Start or resume: immediately `BreatheIn`, phase loop from the top.
    /// The session start timestamp is set once and kept across pauses.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.running {
            return;
        }
        self.running = true;
        self.segment = 0;
        self.segment_elapsed = Duration::ZERO;
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Stop the counter and return the phase to `Begin`. Elapsed time and
    /// the start timestamp are kept.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.segment = 0;
        self.segment_elapsed = Duration::ZERO;
        self.generation += 1;
    }

    /// Pause semantics plus zeroed elapsed time and a cleared start
    /// timestamp.
    pub fn reset(&mut self) {
        self.pause();
        self.elapsed = Duration::ZERO;
        self.started_at = None;
        self.generation += 1;
    }

    /// Advance by a frame delta. A paused timer ignores the call entirely;
    /// that check is the guard that makes stale ticks harmless.
    pub fn advance(&mut self, delta: Duration) {
        if !self.running {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(delta);
        self.segment_elapsed = self.segment_elapsed.saturating_add(delta);

        // Large synthetic deltas may cross several segment boundaries.
        loop {
            let duration = BreathSegment::CYCLE[self.segment].duration();
            if self.segment_elapsed < duration {
                break;
            }
            self.segment_elapsed -= duration;
            self.segment = (self.segment + 1) % BreathSegment::CYCLE.len();
        }
    }
}
