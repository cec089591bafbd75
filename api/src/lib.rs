//! HTTP client for the Recall companion backend.
//!
//! One client, one base URL. The backend bundles several small services
//! behind a single origin: content generation (quiz, flashcards, chat,
//! reminder extraction from free text) and the per-user profile store
//! (journals, scores, sessions, reminders, locations). Generation endpoints
//! sit in front of a language model, so their responses are treated as
//! untrusted shapes and normalized through `recall-types`; profile endpoints
//! are append-only and return the full list on every save.
//!
//! # Error Handling
//!
//! Transient failures (connection errors, HTTP 408/409/429/5xx) are retried
//! with exponential backoff by [`retry`]; whatever survives the retry loop
//! surfaces as [`ApiError`]. Error bodies are read with a size cap and are
//! never rendered without terminal sanitization.

pub mod retry;

use std::fmt;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use reqwest::Method;
pub use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use recall_types::{
    ChatMessage, Flashcard, GeoPoint, GeoRole, JournalEntry, KnownPoints, MeditationSession,
    QuizQuestion, QuizResponseWire, QuizScore, Reminder, ReminderDraft, flashcards_from_value,
    reminder_draft_from_value,
};

use retry::{RetryConfig, RetryOutcome, send_with_retry};

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Per-request timeout for profile CRUD.
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Generation endpoints proxy a language model and routinely run long.
const GENERATION_TIMEOUT_SECS: u64 = 120;

pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("failed to build HTTP client: {e}; falling back to minimal client");
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("minimal HTTP client must build; cannot proceed without one")
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(concat!("recall/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

/// Read an error body with a hard size cap, so a misbehaving server cannot
/// balloon memory on the error path.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

// ============================================================================
// Credentials
// ============================================================================

/// Bearer token for the companion backend.
///
/// `Debug` is redacted so the token cannot leak through logs or error
/// formatting; [`ApiToken::expose_secret`] is the only way to read it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response. The body is capped server text, unsanitized;
    /// callers must sanitize before rendering.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// Transport failure that survived the retry loop.
    #[error("request failed after {attempts} attempts: {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    /// Non-retryable transport failure, including response decode errors.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ApiError {
    /// True when the failure suggests the server is unreachable rather
    /// than objecting to the request.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::Status { .. } => false,
        }
    }
}

async fn resolve(outcome: RetryOutcome) -> Result<reqwest::Response, ApiError> {
    match outcome {
        RetryOutcome::Success(response) => Ok(response),
        RetryOutcome::HttpError(response) => {
            let status = response.status();
            let body = read_capped_error_body(response).await;
            tracing::warn!(%status, "companion backend rejected request");
            Err(ApiError::Status { status, body })
        }
        RetryOutcome::ConnectionError { attempts, source } => {
            Err(ApiError::Connection { attempts, source })
        }
        RetryOutcome::NonRetryable(source) => Err(ApiError::Request(source)),
    }
}

// ============================================================================
// Response envelopes
// ============================================================================

/// The assistant's turn: the reply text plus an optional conversation
/// title the model picks once enough context exists.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize)]
struct JournalsEnvelope {
    #[serde(default)]
    journals: Vec<JournalEntry>,
}

#[derive(Deserialize)]
struct ScoresEnvelope {
    #[serde(default)]
    scores: Vec<QuizScore>,
}

#[derive(Deserialize)]
struct SessionsEnvelope {
    #[serde(default)]
    sessions: Vec<MeditationSession>,
}

#[derive(Deserialize)]
struct RemindersEnvelope {
    #[serde(default)]
    reminders: Vec<Reminder>,
}

// ============================================================================
// Client
// ============================================================================

/// Client for one configured backend origin.
///
/// Cheap to clone; the underlying connection pool is a process-wide
/// [`http_client`].
#[derive(Debug, Clone)]
pub struct CompanionApi {
    base_url: String,
    token: Option<ApiToken>,
    retry: RetryConfig,
}

impl CompanionApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<ApiToken>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token,
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, timeout: Duration) -> reqwest::RequestBuilder {
        let mut builder = http_client()
            .request(method, format!("{}{path}", self.base_url))
            .timeout(timeout);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    /// Run one logical request through the retry loop and log how it went.
    async fn dispatch<F>(&self, path: &str, build: F) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let started = Instant::now();
        let outcome = send_with_retry(build, &self.retry).await;
        let result = resolve(outcome).await;
        tracing::debug!(
            path,
            ok = result.is_ok(),
            latency_ms = started.elapsed().as_millis() as u64,
            "companion request finished"
        );
        result
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        let response = self
            .dispatch(path, || self.request(Method::GET, path, timeout))
            .await?;
        Ok(response.json().await?)
    }

    async fn post_json<T>(&self, path: &str, body: &Value, timeout: Duration) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .dispatch(path, || self.request(Method::POST, path, timeout).json(body))
            .await?;
        Ok(response.json().await?)
    }

    // ------------------------------------------------------------------
    // Liveness
    // ------------------------------------------------------------------

    pub async fn health(&self) -> Result<(), ApiError> {
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        self.dispatch("/health", || self.request(Method::GET, "/health", timeout))
            .await
            .map(drop)
    }

    // ------------------------------------------------------------------
    // Content generation
    // ------------------------------------------------------------------

    /// Generate quiz questions from the journal corpus. Answers are
    /// normalized from the backend's answer-text form to option indices;
    /// questions whose answer text matches no option fall back to the
    /// first option and are logged.
    pub async fn generate_quiz(
        &self,
        journals: &[JournalEntry],
        user_name: &str,
    ) -> Result<Vec<QuizQuestion>, ApiError> {
        let body = json!({ "journals": journals, "userName": user_name });
        let wire: QuizResponseWire = self
            .post_json(
                "/generate-quiz",
                &body,
                Duration::from_secs(GENERATION_TIMEOUT_SECS),
            )
            .await?;

        let questions: Vec<QuizQuestion> =
            wire.questions.into_iter().map(QuizQuestion::from_wire).collect();
        for question in &questions {
            if !question.answer_matched() {
                tracing::warn!(
                    prompt = question.prompt(),
                    "quiz answer text matched no option; defaulting to the first"
                );
            }
        }
        Ok(questions)
    }

    /// Generate flashcards from the journal corpus, tolerating the
    /// backend's shape drift. Items without a summary are dropped.
    pub async fn generate_flashcards(
        &self,
        journals: &[JournalEntry],
    ) -> Result<Vec<Flashcard>, ApiError> {
        let body = json!({ "journals": journals });
        let value: Value = self
            .post_json(
                "/generate-flashcards",
                &body,
                Duration::from_secs(GENERATION_TIMEOUT_SECS),
            )
            .await?;

        let (cards, discarded) = flashcards_from_value(&value);
        if discarded > 0 {
            tracing::warn!(discarded, "dropped flashcards without a summary");
        }
        Ok(cards)
    }

    /// One companion-chat turn. The full visible transcript is sent each
    /// time; the backend holds no conversation state.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        user_name: &str,
        user_id: &str,
    ) -> Result<ChatReply, ApiError> {
        let body = json!({ "messages": messages, "userName": user_name, "userId": user_id });
        self.post_json("/chat", &body, Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .await
    }

    /// Ask the backend to extract a reminder from free text. `None` means
    /// the text contained no reminder (the model answered "NO" or prose).
    pub async fn extract_reminder(&self, text: &str) -> Result<Option<ReminderDraft>, ApiError> {
        let body = json!({ "text": text });
        let value: Value = self
            .post_json("/analyze", &body, Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .await?;
        Ok(reminder_draft_from_value(&value))
    }

    // ------------------------------------------------------------------
    // Profile store (append-only lists; saves return the full list)
    // ------------------------------------------------------------------

    pub async fn journals(&self, user_id: &str) -> Result<Vec<JournalEntry>, ApiError> {
        let envelope: JournalsEnvelope = self.get_json(&format!("/users/{user_id}/journals")).await?;
        Ok(envelope.journals)
    }

    pub async fn append_journal(
        &self,
        user_id: &str,
        entry: &JournalEntry,
    ) -> Result<Vec<JournalEntry>, ApiError> {
        let body = json!(entry);
        let envelope: JournalsEnvelope = self
            .post_json(
                &format!("/users/{user_id}/journals"),
                &body,
                Duration::from_secs(REQUEST_TIMEOUT_SECS),
            )
            .await?;
        Ok(envelope.journals)
    }

    pub async fn quiz_scores(&self, user_id: &str) -> Result<Vec<QuizScore>, ApiError> {
        let envelope: ScoresEnvelope =
            self.get_json(&format!("/users/{user_id}/quiz-scores")).await?;
        Ok(envelope.scores)
    }

    pub async fn append_quiz_score(
        &self,
        user_id: &str,
        score: &QuizScore,
    ) -> Result<Vec<QuizScore>, ApiError> {
        let body = json!(score);
        let envelope: ScoresEnvelope = self
            .post_json(
                &format!("/users/{user_id}/quiz-scores"),
                &body,
                Duration::from_secs(REQUEST_TIMEOUT_SECS),
            )
            .await?;
        Ok(envelope.scores)
    }

    pub async fn meditation_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<MeditationSession>, ApiError> {
        let envelope: SessionsEnvelope = self
            .get_json(&format!("/users/{user_id}/meditation-sessions"))
            .await?;
        Ok(envelope.sessions)
    }

    pub async fn append_meditation_session(
        &self,
        user_id: &str,
        session: &MeditationSession,
    ) -> Result<Vec<MeditationSession>, ApiError> {
        let body = json!(session);
        let envelope: SessionsEnvelope = self
            .post_json(
                &format!("/users/{user_id}/meditation-sessions"),
                &body,
                Duration::from_secs(REQUEST_TIMEOUT_SECS),
            )
            .await?;
        Ok(envelope.sessions)
    }

    pub async fn reminders(&self, user_id: &str) -> Result<Vec<Reminder>, ApiError> {
        let envelope: RemindersEnvelope =
            self.get_json(&format!("/users/{user_id}/reminders")).await?;
        Ok(envelope.reminders)
    }

    pub async fn append_reminder(
        &self,
        user_id: &str,
        reminder: &Reminder,
    ) -> Result<Vec<Reminder>, ApiError> {
        let body = json!(reminder);
        let envelope: RemindersEnvelope = self
            .post_json(
                &format!("/users/{user_id}/reminders"),
                &body,
                Duration::from_secs(REQUEST_TIMEOUT_SECS),
            )
            .await?;
        Ok(envelope.reminders)
    }

    // ------------------------------------------------------------------
    // Locations and SOS
    // ------------------------------------------------------------------

    /// Last-known point per role. Absent roles come back as `None`.
    pub async fn known_points(&self, user_id: &str) -> Result<KnownPoints, ApiError> {
        self.get_json(&format!("/users/{user_id}/locations")).await
    }

    /// Store the most recent point for one role. Only the latest point is
    /// kept server-side; there is no location history.
    pub async fn save_location(
        &self,
        user_id: &str,
        role: GeoRole,
        point: GeoPoint,
    ) -> Result<(), ApiError> {
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        let path = format!("/users/{user_id}/locations/{}", role.as_str());
        self.dispatch(&path, || {
            self.request(Method::PUT, &path, timeout).json(&point)
        })
        .await
        .map(drop)
    }

    /// Fire-and-forget SOS. Success means the backend accepted the alert,
    /// not that a call was placed.
    pub async fn send_sos(&self, user_id: &str, point: Option<GeoPoint>) -> Result<(), ApiError> {
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        let path = format!("/users/{user_id}/sos");
        let body = json!({ "point": point });
        self.dispatch(&path, || {
            self.request(Method::POST, &path, timeout).json(&body)
        })
        .await
        .map(drop)
    }
}
