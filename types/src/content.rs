//! Content types and wire-shape normalization.
//!
//! The backend's generation endpoints are AI-backed and loose about shape:
//! the flashcard array may arrive under any of three keys, media fields vary
//! between `mediaUrl` and `mediaUri`, and quiz answers come as the correct
//! option's *text*, not its index. Everything here turns those shapes into
//! strict types, with documented fallbacks instead of hard failures.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Option count the backend promises per quiz question; used as the
/// fallback option list when a malformed question arrives without any.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// Reminders inside this window are rendered as due.
pub const REMINDER_DUE_WINDOW_MINUTES: i64 = 15;

// ============================================================================
// Journals
// ============================================================================

/// One journal entry; the prompt corpus for quiz and flashcard generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    #[must_use]
    pub fn new(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            caption: None,
            created_at,
        }
    }
}

// ============================================================================
// Quiz
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizDifficulty {
    Easy,
    Hard,
}

/// A quiz question exactly as the generator returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizQuestionWire {
    #[serde(default)]
    pub tag: Option<String>,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizResponseWire {
    #[serde(default)]
    pub questions: Vec<QuizQuestionWire>,
}

/// A normalized quiz question with the answer resolved to an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    difficulty: QuizDifficulty,
    prompt: String,
    options: Vec<String>,
    answer_index: usize,
    answer_matched: bool,
    explanation: String,
}

impl QuizQuestion {
    /// Normalize a wire question. The `correct` string maps to an index by
    /// exact match against the options, first match winning. A miss keeps
    /// the documented fallback of index 0 but records the mismatch so the
    /// caller can log it; an empty option list becomes the fixed-size blank
    /// list the generator itself emits on failure.
    #[must_use]
    pub fn from_wire(wire: QuizQuestionWire) -> Self {
        let options = if wire.options.is_empty() {
            vec![String::new(); QUIZ_OPTION_COUNT]
        } else {
            wire.options
        };

        let (answer_index, answer_matched) =
            match options.iter().position(|option| *option == wire.correct) {
                Some(index) => (index, true),
                None => (0, false),
            };

        let difficulty = match wire.tag.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("hard") => QuizDifficulty::Hard,
            _ => QuizDifficulty::Easy,
        };

        Self {
            difficulty,
            prompt: wire.question,
            options,
            answer_index,
            answer_matched,
            explanation: wire.explanation,
        }
    }

    #[must_use]
    pub fn difficulty(&self) -> QuizDifficulty {
        self.difficulty
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer_index(&self) -> usize {
        self.answer_index
    }

    /// False when the wire `correct` value matched no option and the
    /// index-0 fallback was applied.
    #[must_use]
    pub fn answer_matched(&self) -> bool {
        self.answer_matched
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer_index
    }
}

/// One finished quiz attempt as the history endpoint stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub score: u32,
    pub total: u32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Flashcards
// ============================================================================

/// A normalized flashcard: `{ title?, summary, mediaUrl? }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    title: Option<String>,
    summary: String,
    media_url: Option<String>,
}

impl Flashcard {
    #[must_use]
    pub fn new(title: Option<String>, summary: String, media_url: Option<String>) -> Self {
        Self {
            title,
            summary,
            media_url,
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn media_url(&self) -> Option<&str> {
        self.media_url.as_deref()
    }
}

/// Keys the card array has been observed under, in preference order.
const FLASHCARD_ARRAY_KEYS: [&str; 3] = ["flashcards", "cards", "questions"];

/// Normalize a flashcard response body. Tolerates the known array keys and
/// both media field spellings; items without a non-empty summary are
/// discarded. Returns how many items were dropped so the caller can log.
#[must_use]
pub fn flashcards_from_value(value: &Value) -> (Vec<Flashcard>, usize) {
    let items = FLASHCARD_ARRAY_KEYS
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_array));
    let Some(items) = items else {
        return (Vec::new(), 0);
    };

    let mut cards = Vec::with_capacity(items.len());
    let mut discarded = 0;
    for item in items {
        let summary = item
            .get("summary")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if summary.is_empty() {
            discarded += 1;
            continue;
        }

        let title = item
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let media_url = item
            .get("mediaUrl")
            .or_else(|| item.get("mediaUri"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        cards.push(Flashcard {
            title,
            summary: summary.to_string(),
            media_url,
        });
    }
    (cards, discarded)
}

// ============================================================================
// Meditation
// ============================================================================

/// One saved breathing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationSession {
    pub seconds: u64,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One companion-chat turn, in the backend's `{ role, text }` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

// ============================================================================
// Reminders
// ============================================================================

/// A stored reminder: separate date and time strings, exactly as the
/// backend keeps them, plus call bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "calledAt", default, skip_serializing_if = "Option::is_none")]
    pub called_at: Option<DateTime<Utc>>,
}

impl Reminder {
    /// Resolve the reminder's wall-clock schedule, tolerating ISO-8601
    /// (space or `T` separated, with or without seconds) and the legacy
    /// `DD/MM/YYYY HH:MM` form.
    #[must_use]
    pub fn schedule(&self) -> Option<NaiveDateTime> {
        parse_schedule(&self.date, &self.time)
    }

    /// Due inside the notification window: scheduled within the next 15
    /// minutes, not already called.
    #[must_use]
    pub fn is_due_soon(&self, now: NaiveDateTime) -> bool {
        if self.called_at.is_some() {
            return false;
        }
        let Some(at) = self.schedule() else {
            return false;
        };
        let until = at.signed_duration_since(now);
        until >= chrono::Duration::zero()
            && until <= chrono::Duration::minutes(REMINDER_DUE_WINDOW_MINUTES)
    }
}

fn parse_schedule(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    let time = time.trim();
    if date.is_empty() || time.is_empty() {
        return None;
    }

    // A stray ISO "T" separator inside either field folds into the space form.
    let combined = format!("{date} {time}").replace('T', " ");
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%d/%m/%Y %H:%M"];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&combined, format).ok())
}

/// A reminder drafted from free text by the extraction endpoint, pending
/// user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDraft {
    pub date: String,
    pub time: String,
    pub message: String,
}

/// Interpret the extraction endpoint's `result` field. The model answers
/// with either a `{date, time, message}` object, the literal string "NO"
/// when no reminder was found, or unparseable prose (treated as none).
#[must_use]
pub fn reminder_draft_from_value(value: &Value) -> Option<ReminderDraft> {
    let result = value.get("result")?;
    let object = result.as_object()?;

    let field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    Some(ReminderDraft {
        date: field("date")?,
        time: field("time")?,
        message: field("message")?,
    })
}
