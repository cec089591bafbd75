//! Swipeable flashcard deck.
//!
//! Tracks a cursor into a card list and a live 2D drag offset. Releasing a
//! drag past a quarter of the viewport width commits an advance in that
//! direction; anything short of it animates the card back to origin. Manual
//! next/previous controls run through the exact same commit path as a
//! successful swipe.

use std::time::Duration;

use crate::content::Flashcard;
use crate::timing::{PhaseTimer, ease_out};

/// Fraction of the viewport width a release must cross to commit.
pub const SWIPE_THRESHOLD_RATIO: f32 = 0.25;
/// Rotation reaches its extreme at 1.5 viewport widths of horizontal drag.
pub const ROTATION_RANGE_WIDTHS: f32 = 1.5;
/// Maximum card tilt in degrees at the rotation range edge.
pub const MAX_ROTATION_DEGREES: f32 = 15.0;
/// Off-screen slide duration for a committed advance.
pub const COMMIT_DURATION: Duration = Duration::from_millis(250);
/// Return-to-origin duration for a cancelled drag.
pub const CANCEL_DURATION: Duration = Duration::from_millis(200);

/// Live drag offset in cells/pixels, origin at the card's rest position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragOffset {
    pub dx: f32,
    pub dy: f32,
}

impl DragOffset {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Forward,
    Backward,
}

/// Decision made when a drag is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDecision {
    Committed(SwipeDirection),
    Cancelled,
}

/// What the deck currently points at. Exhaustion is an explicit state, not
/// an out-of-range index for the render layer to trip over.
#[derive(Debug, PartialEq, Eq)]
pub enum DeckCard<'a> {
    HasCard(&'a Flashcard),
    Exhausted,
}

#[derive(Debug, Clone)]
enum DeckMotion {
    Idle,
    Dragging {
        offset: DragOffset,
    },
    Committing {
        direction: SwipeDirection,
        from: DragOffset,
        target_dx: f32,
        timer: PhaseTimer,
    },
    Cancelling {
        from: DragOffset,
        timer: PhaseTimer,
    },
}

/// Cursor plus gesture state over an ordered card list.
#[derive(Debug, Clone)]
pub struct CardDeck {
    cards: Vec<Flashcard>,
    // 0..=len; len is the exhausted position
    index: usize,
    motion: DeckMotion,
}

impl CardDeck {
    #[must_use]
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards,
            index: 0,
            motion: DeckMotion::Idle,
        }
    }

    /// Replace the backing cards and rewind to the first one. Used by the
    /// exhausted screen's explicit reload action.
    pub fn reload(&mut self, cards: Vec<Flashcard>) {
        self.cards = cards;
        self.index = 0;
        self.motion = DeckMotion::Idle;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cursor position in `0..=len`, for "card N of M" displays.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current(&self) -> DeckCard<'_> {
        match self.cards.get(self.index) {
            Some(card) => DeckCard::HasCard(card),
            None => DeckCard::Exhausted,
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.cards.len()
    }

    /// True while a commit or cancel animation is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        matches!(
            self.motion,
            DeckMotion::Committing { .. } | DeckMotion::Cancelling { .. }
        )
    }

    /// The offset to render the top card at for the current frame.
    #[must_use]
    pub fn offset(&self) -> DragOffset {
        match &self.motion {
            DeckMotion::Idle => DragOffset::ZERO,
            DeckMotion::Dragging { offset } => *offset,
            DeckMotion::Committing {
                from,
                target_dx,
                timer,
                ..
            } => {
                let t = ease_out(timer.progress());
                DragOffset {
                    dx: from.dx + (target_dx - from.dx) * t,
                    dy: from.dy * (1.0 - t),
                }
            }
            DeckMotion::Cancelling { from, timer } => {
                let t = ease_out(timer.progress());
                DragOffset {
                    dx: from.dx * (1.0 - t),
                    dy: from.dy * (1.0 - t),
                }
            }
        }
    }

    /// Card tilt for the current horizontal offset: linear from
    /// -MAX..+MAX degrees over `[-1.5*width, +1.5*width]`. Cosmetic only.
    #[must_use]
    pub fn rotation_degrees(&self, width: f32) -> f32 {
        let range = ROTATION_RANGE_WIDTHS * width;
        if range <= 0.0 {
            return 0.0;
        }
        (self.offset().dx / range).clamp(-1.0, 1.0) * MAX_ROTATION_DEGREES
    }

    /// Move the live drag offset. Ignored while an animation owns the card
    /// or when there is no card under the cursor.
    pub fn drag_by(&mut self, dx: f32, dy: f32) {
        if self.is_exhausted() {
            return;
        }
        match &mut self.motion {
            DeckMotion::Idle => {
                self.motion = DeckMotion::Dragging {
                    offset: DragOffset { dx, dy },
                };
            }
            DeckMotion::Dragging { offset } => {
                offset.dx += dx;
                offset.dy += dy;
            }
            DeckMotion::Committing { .. } | DeckMotion::Cancelling { .. } => {}
        }
    }

    /// End the active drag against a viewport width and decide commit or
    /// cancel. Threshold: strictly more than a quarter of the width.
    pub fn release(&mut self, width: f32) -> SwipeDecision {
        let DeckMotion::Dragging { offset } = &self.motion else {
            return SwipeDecision::Cancelled;
        };
        let offset = *offset;

        let threshold = SWIPE_THRESHOLD_RATIO * width;
        if offset.dx > threshold {
            self.begin_commit(SwipeDirection::Forward, offset, width)
        } else if offset.dx < -threshold {
            self.begin_commit(SwipeDirection::Backward, offset, width)
        } else {
            self.motion = DeckMotion::Cancelling {
                from: offset,
                timer: PhaseTimer::new(CANCEL_DURATION),
            };
            SwipeDecision::Cancelled
        }
    }

    /// Manual "next" control; same commit path as a forward swipe.
    pub fn next(&mut self, width: f32) -> SwipeDecision {
        self.begin_commit(SwipeDirection::Forward, self.offset(), width)
    }

    /// Manual "previous" control; same commit path as a backward swipe.
    pub fn previous(&mut self, width: f32) -> SwipeDecision {
        self.begin_commit(SwipeDirection::Backward, self.offset(), width)
    }

    fn begin_commit(
        &mut self,
        direction: SwipeDirection,
        from: DragOffset,
        width: f32,
    ) -> SwipeDecision {
        if self.is_animating() {
            return SwipeDecision::Cancelled;
        }
        // Clamped movement: a commit that cannot change the index is dropped
        // before any animation starts. Advancing off the last card is valid
        // (it lands in Exhausted); advancing further is not.
        let movable = match direction {
            SwipeDirection::Forward => self.index < self.cards.len(),
            SwipeDirection::Backward => self.index > 0,
        };
        if !movable {
            self.motion = DeckMotion::Idle;
            return SwipeDecision::Cancelled;
        }

        let sign = match direction {
            SwipeDirection::Forward => 1.0,
            SwipeDirection::Backward => -1.0,
        };
        self.motion = DeckMotion::Committing {
            direction,
            from,
            target_dx: sign * ROTATION_RANGE_WIDTHS * width,
            timer: PhaseTimer::new(COMMIT_DURATION),
        };
        SwipeDecision::Committed(direction)
    }

    /// Advance animations by a frame delta. The index only changes when the
    /// commit slide finishes; the offset then resets for the next card.
    pub fn advance(&mut self, delta: Duration) {
        match &mut self.motion {
            DeckMotion::Committing {
                direction, timer, ..
            } => {
                timer.advance(delta);
                if timer.is_finished() {
                    match direction {
                        SwipeDirection::Forward => {
                            self.index = (self.index + 1).min(self.cards.len());
                        }
                        SwipeDirection::Backward => {
                            self.index = self.index.saturating_sub(1);
                        }
                    }
                    self.motion = DeckMotion::Idle;
                }
            }
            DeckMotion::Cancelling { timer, .. } => {
                timer.advance(delta);
                if timer.is_finished() {
                    self.motion = DeckMotion::Idle;
                }
            }
            DeckMotion::Idle | DeckMotion::Dragging { .. } => {}
        }
    }
}
