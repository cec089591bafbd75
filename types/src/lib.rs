//! Core domain types for Recall.
//!
//! This crate contains pure domain state with no IO and no async: the
//! interaction state machines (matching pairs, card deck, breathing timer,
//! map region) advance only through explicit tick deltas, the content types
//! normalize the companion backend's wire shapes, and the sanitizer guards
//! everything those shapes carry onto the terminal. Everything here can be
//! used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod breathing;
mod content;
mod deck;
mod puzzle;
mod region;
mod sanitize;
mod timing;
pub mod ui;

pub use breathing::{
    BreathPhase, BreathSegment, BreathingTimer, PHASE_DURATION, TRAILING_PAUSE,
};
pub use content::{
    ChatMessage, ChatRole, Flashcard, JournalEntry, MeditationSession, QUIZ_OPTION_COUNT,
    QuizDifficulty, QuizQuestion, QuizQuestionWire, QuizResponseWire, QuizScore,
    REMINDER_DUE_WINDOW_MINUTES, Reminder, ReminderDraft, flashcards_from_value,
    reminder_draft_from_value,
};
pub use deck::{
    CANCEL_DURATION, COMMIT_DURATION, CardDeck, DeckCard, DragOffset, MAX_ROTATION_DEGREES,
    ROTATION_RANGE_WIDTHS, SWIPE_THRESHOLD_RATIO, SwipeDecision, SwipeDirection,
};
pub use puzzle::{PairsBoard, PuzzleCell, RESOLVE_DELAY, ResolveOutcome};
pub use region::{
    FALLBACK_CENTER, FALLBACK_DELTA, GeoPoint, GeoRole, KnownPoints, MapRegion, MIN_DELTA,
    SINGLE_POINT_DELTA, SPAN_FACTOR,
};
pub use sanitize::sanitize_display_text;
pub use timing::{PhaseTimer, ease_out, normalized_progress};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A string guaranteed to be non-empty after trimming.
///
/// Journal entries, chat messages, and reminder text all require substance
/// before they may be sent; constructing this type is that check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("text must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod lib_tests {
    use super::NonEmptyString;

    #[test]
    fn rejects_blank_strings() {
        assert!(NonEmptyString::new("").is_err());
        assert!(NonEmptyString::new("   \t\n").is_err());
    }

    #[test]
    fn keeps_original_content() {
        let s = NonEmptyString::new("  walked to the market  ").unwrap();
        assert_eq!(s.as_str(), "  walked to the market  ");
    }

    #[test]
    fn serde_roundtrip_enforces_invariant() {
        let ok: Result<NonEmptyString, _> = serde_json::from_str("\"hi\"");
        assert!(ok.is_ok());
        let bad: Result<NonEmptyString, _> = serde_json::from_str("\"  \"");
        assert!(bad.is_err());
    }
}
