//! Core engine for Recall - application state and backend orchestration.
//!
//! This crate contains the App state machine without TUI dependencies.
//! Backend calls run on spawned tasks and report back over a channel;
//! `poll_tasks` drains completions once per frame and applies only the
//! ones that are still current (guard-then-apply).

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;

use recall_api::{ApiError, ChatReply, CompanionApi};
use recall_types::ui::UiOptions;
use recall_types::{
    BreathingTimer, CANCEL_DURATION, COMMIT_DURATION, CardDeck, ChatMessage, Flashcard, GeoPoint,
    GeoRole, JournalEntry, KnownPoints, MapRegion, MeditationSession, PairsBoard, QuizQuestion,
    QuizScore, Reminder, ReminderDraft, ResolveOutcome, sanitize_display_text,
};

mod config;
pub use config::{
    API_TOKEN_ENV, ConfigError, DEFAULT_SERVER_URL, DEFAULT_USER_ID, DEFAULT_USER_NAME,
    LoggingConfig, Profile, RecallConfig, SERVER_URL_ENV, ServerConfig, USER_NAME_ENV, UiConfig,
    UserConfig, config_path, expand_env_vars,
};

mod draft;
pub use draft::Draft;


/// Cap on task completions applied per `poll_tasks` call.
const TASK_EVENT_BUDGET: usize = 32;
/// How long a status line stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(6);

/// Grid width of the matching-pairs board.
pub const PUZZLE_COLUMNS: usize = 4;

const PUZZLE_SYMBOLS: &[&str] = &["☀", "☾", "★", "♣", "♥", "♪", "✿", "⚓"];
const PUZZLE_SYMBOLS_ASCII: &[&str] = &["A", "B", "C", "D", "E", "F", "G", "H"];

/// Card width assumed until the first draw reports the real one.
const DEFAULT_CARD_WIDTH: f32 = 72.0;
/// Fraction of the card width one arrow press drags it.
const CARD_NUDGE_RATIO: f32 = 0.08;

// ============================================================================
// Screens and status line
// ============================================================================

/// Screens reachable from the home menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Journal,
    Quiz,
    Puzzle,
    Cards,
    Breathe,
    Map,
    Chat,
    Reminders,
}

impl Screen {
    /// Home menu entries, in display order.
    pub const MENU: [Self; 8] = [
        Self::Journal,
        Self::Quiz,
        Self::Puzzle,
        Self::Cards,
        Self::Breathe,
        Self::Map,
        Self::Chat,
        Self::Reminders,
    ];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Journal => "Journal",
            Self::Quiz => "Memory Quiz",
            Self::Puzzle => "Matching Pairs",
            Self::Cards => "Memory Cards",
            Self::Breathe => "Breathe",
            Self::Map => "Places",
            Self::Chat => "Companion",
            Self::Reminders => "Reminders",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One transient status message; cleared after a few seconds.
#[derive(Debug, Clone)]
pub struct StatusLine {
    kind: StatusKind,
    text: String,
    remaining: Duration,
}

impl StatusLine {
    #[must_use]
    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// Background task plumbing
// ============================================================================

/// One slot per concern; spawning into an occupied slot aborts the
/// in-flight task and supersedes its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TaskKind {
    Health,
    Journals,
    SaveJournal,
    Quiz,
    Scores,
    SaveScore,
    Cards,
    Chat,
    Sessions,
    SaveSession,
    Reminders,
    ExtractReminder,
    SaveReminder,
    Points,
    SaveLocation,
    Sos,
}

enum TaskPayload {
    Health(Result<(), ApiError>),
    Journals(Result<Vec<JournalEntry>, ApiError>),
    JournalSaved(Result<Vec<JournalEntry>, ApiError>),
    Quiz(Result<Vec<QuizQuestion>, ApiError>),
    Scores(Result<Vec<QuizScore>, ApiError>),
    ScoreSaved(Result<Vec<QuizScore>, ApiError>),
    Cards(Result<Vec<Flashcard>, ApiError>),
    Chat(Result<ChatReply, ApiError>),
    Sessions(Result<Vec<MeditationSession>, ApiError>),
    SessionSaved {
        generation: u64,
        result: Result<Vec<MeditationSession>, ApiError>,
    },
    Reminders(Result<Vec<Reminder>, ApiError>),
    ReminderExtracted(Result<Option<ReminderDraft>, ApiError>),
    ReminderSaved(Result<Vec<Reminder>, ApiError>),
    Points(Result<KnownPoints, ApiError>),
    LocationSaved {
        role: GeoRole,
        point: GeoPoint,
        result: Result<(), ApiError>,
    },
    SosSent(Result<(), ApiError>),
}

struct TaskEvent {
    kind: TaskKind,
    seq: u64,
    payload: TaskPayload,
}

struct PendingTask {
    seq: u64,
    abort_handle: AbortHandle,
}

// ============================================================================
// Per-screen state
// ============================================================================

#[derive(Debug, Default)]
pub struct HomeState {
    selected: usize,
    sos_armed: bool,
    editing_name: bool,
    name_draft: Draft,
}

impl HomeState {
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn sos_armed(&self) -> bool {
        self.sos_armed
    }

    #[must_use]
    pub fn editing_name(&self) -> bool {
        self.editing_name
    }

    #[must_use]
    pub fn name_draft(&self) -> &Draft {
        &self.name_draft
    }
}

#[derive(Debug, Default)]
pub struct JournalState {
    entries: Vec<JournalEntry>,
    draft: Draft,
    loaded: bool,
    loading: bool,
    saving: bool,
}

impl JournalState {
    /// Entries as the backend returned them: oldest first.
    #[must_use]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }
}

#[derive(Debug, Default)]
pub struct QuizState {
    questions: Vec<QuizQuestion>,
    current: usize,
    selected: Vec<Option<usize>>,
    revealed: bool,
    score_recorded: bool,
    loading: bool,
    past_scores: Vec<QuizScore>,
    scores_loaded: bool,
}

impl QuizState {
    fn install(&mut self, questions: Vec<QuizQuestion>) {
        self.selected = vec![None; questions.len()];
        self.questions = questions;
        self.current = 0;
        self.revealed = false;
        self.score_recorded = false;
    }

    #[must_use]
    pub fn question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    /// (already answered, total); the index shown is `answered + 1`.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.current.min(self.questions.len()), self.questions.len())
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.questions.is_empty() && self.current >= self.questions.len()
    }

    /// The choice made on the current question, once revealed.
    #[must_use]
    pub fn choice(&self) -> Option<usize> {
        self.selected.get(self.current).copied().flatten()
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.selected)
            .filter(|(question, choice)| choice.is_some_and(|c| question.is_correct(c)))
            .count()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn past_scores(&self) -> &[QuizScore] {
        &self.past_scores
    }
}

#[derive(Debug)]
pub struct PuzzleState {
    board: PairsBoard,
    cursor: usize,
}

impl PuzzleState {
    fn new(ascii_only: bool) -> Self {
        let symbols = if ascii_only {
            PUZZLE_SYMBOLS_ASCII
        } else {
            PUZZLE_SYMBOLS
        };
        Self {
            board: PairsBoard::deal(symbols),
            cursor: 0,
        }
    }

    #[must_use]
    pub fn board(&self) -> &PairsBoard {
        &self.board
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[derive(Debug)]
pub struct CardsState {
    deck: CardDeck,
    loading: bool,
    /// Card width in terminal cells, cached from the last draw so key
    /// handlers can translate presses into pixel-space gestures.
    width: f32,
}

impl CardsState {
    #[must_use]
    pub fn deck(&self) -> &CardDeck {
        &self.deck
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }
}

#[derive(Debug, Default)]
pub struct BreatheState {
    timer: BreathingTimer,
    sessions: Vec<MeditationSession>,
    sessions_loaded: bool,
    saving: bool,
}

impl BreatheState {
    #[must_use]
    pub fn timer(&self) -> &BreathingTimer {
        &self.timer
    }

    #[must_use]
    pub fn sessions(&self) -> &[MeditationSession] {
        &self.sessions
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }
}

#[derive(Debug, Default)]
pub struct MapState {
    points: KnownPoints,
    loaded: bool,
    loading: bool,
    editing: Option<GeoRole>,
    draft: Draft,
    saving: Option<GeoRole>,
}

impl MapState {
    #[must_use]
    pub fn points(&self) -> &KnownPoints {
        &self.points
    }

    #[must_use]
    pub fn region(&self) -> MapRegion {
        self.points.region()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The role whose coordinates are being typed, if any.
    #[must_use]
    pub fn editing(&self) -> Option<GeoRole> {
        self.editing
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    #[must_use]
    pub fn saving(&self) -> Option<GeoRole> {
        self.saving
    }
}

#[derive(Debug)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    title: Option<String>,
    draft: Draft,
    waiting: bool,
}

impl ChatState {
    fn new(user_name: &str) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(format!(
                "Hi {user_name}! I'm always here if you want to talk."
            ))],
            title: None,
            draft: Draft::default(),
            waiting: false,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// True while a reply is on its way; sends are ignored meanwhile.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }
}

#[derive(Debug, Default)]
pub struct RemindersState {
    reminders: Vec<Reminder>,
    loaded: bool,
    loading: bool,
    draft: Draft,
    pending: Option<ReminderDraft>,
    analyzing: bool,
    saving: bool,
}

impl RemindersState {
    #[must_use]
    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// An extracted reminder awaiting the user's confirmation.
    #[must_use]
    pub fn pending(&self) -> Option<&ReminderDraft> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Reminders due within the next few minutes, for the home badge.
    #[must_use]
    pub fn due_soon(&self, now: chrono::NaiveDateTime) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|reminder| reminder.is_due_soon(now))
            .collect()
    }
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    api: CompanionApi,
    profile: Profile,
    ui: UiOptions,
    screen: Screen,
    home: HomeState,
    journal: JournalState,
    quiz: QuizState,
    puzzle: PuzzleState,
    cards: CardsState,
    breathe: BreatheState,
    map: MapState,
    chat: ChatState,
    reminders: RemindersState,
    status: Option<StatusLine>,
    /// `None` until the first backend response settles it.
    backend_ok: Option<bool>,
    should_quit: bool,
    ticks: u64,
    last_frame: Instant,
    next_seq: u64,
    pending: HashMap<TaskKind, PendingTask>,
    task_tx: mpsc::UnboundedSender<TaskEvent>,
    task_rx: mpsc::UnboundedReceiver<TaskEvent>,
}

impl App {
    /// Build the app from the config file and environment.
    ///
    /// A malformed config file is a startup error; a missing one is not.
    pub fn new() -> anyhow::Result<Self> {
        let config = RecallConfig::load()?;
        let profile = Profile::resolve(config.as_ref());
        let ui = config
            .as_ref()
            .map(RecallConfig::ui_options)
            .unwrap_or_default();
        Ok(Self::with_profile(profile, ui))
    }

    #[must_use]
    pub fn with_profile(profile: Profile, ui: UiOptions) -> Self {
        let api = CompanionApi::new(profile.server_url.clone(), profile.api_token.clone());
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        Self {
            api,
            chat: ChatState::new(&profile.user_name),
            puzzle: PuzzleState::new(ui.ascii_only),
            profile,
            ui,
            screen: Screen::Home,
            home: HomeState::default(),
            journal: JournalState::default(),
            quiz: QuizState::default(),
            cards: CardsState {
                deck: CardDeck::new(Vec::new()),
                loading: false,
                width: DEFAULT_CARD_WIDTH,
            },
            breathe: BreatheState::default(),
            map: MapState::default(),
            reminders: RemindersState::default(),
            status: None,
            backend_ok: None,
            should_quit: false,
            ticks: 0,
            last_frame: Instant::now(),
            next_seq: 0,
            pending: HashMap::new(),
            task_tx,
            task_rx,
        }
    }

    /// Kick off the startup fetches: liveness, journals (the generation
    /// corpus), reminders (the due badge) and known locations (SOS).
    pub fn bootstrap(&mut self) {
        self.check_health();
        self.fetch_journals();
        self.fetch_reminders();
        self.refresh_points();
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui
    }

    #[must_use]
    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn backend_ok(&self) -> Option<bool> {
        self.backend_ok
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Animation frame counter, for spinners.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn home(&self) -> &HomeState {
        &self.home
    }

    #[must_use]
    pub fn journal(&self) -> &JournalState {
        &self.journal
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizState {
        &self.quiz
    }

    #[must_use]
    pub fn puzzle(&self) -> &PuzzleState {
        &self.puzzle
    }

    #[must_use]
    pub fn cards(&self) -> &CardsState {
        &self.cards
    }

    #[must_use]
    pub fn breathe(&self) -> &BreatheState {
        &self.breathe
    }

    #[must_use]
    pub fn map(&self) -> &MapState {
        &self.map
    }

    #[must_use]
    pub fn chat(&self) -> &ChatState {
        &self.chat
    }

    #[must_use]
    pub fn reminders(&self) -> &RemindersState {
        &self.reminders
    }

    /// The draft receiving typed characters on the current screen, if any.
    pub fn active_draft_mut(&mut self) -> Option<&mut Draft> {
        match self.screen {
            Screen::Home if self.home.editing_name => Some(&mut self.home.name_draft),
            Screen::Journal => Some(&mut self.journal.draft),
            Screen::Chat => Some(&mut self.chat.draft),
            Screen::Reminders => Some(&mut self.reminders.draft),
            Screen::Map if self.map.editing.is_some() => Some(&mut self.map.draft),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// Get elapsed time since last frame and update timing.
    pub fn frame_elapsed(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        elapsed
    }

    /// Advance every time-driven machine by a frame delta.
    pub fn tick(&mut self, delta: Duration) {
        self.ticks = self.ticks.wrapping_add(1);

        if let Some(outcome) = self.puzzle.board.advance(delta)
            && outcome == ResolveOutcome::Matched
            && self.puzzle.board.is_solved()
        {
            let moves = self.puzzle.board.moves();
            self.set_status(
                StatusKind::Success,
                format!("You matched them all in {moves} moves!"),
            );
        }

        self.cards.deck.advance(delta);
        self.breathe.timer.advance(delta);

        if let Some(status) = &mut self.status {
            status.remaining = status.remaining.saturating_sub(delta);
            if status.remaining.is_zero() {
                self.status = None;
            }
        }
    }

    /// Drain background task completions, dropping superseded ones.
    pub fn poll_tasks(&mut self) {
        let mut processed = 0usize;
        while processed < TASK_EVENT_BUDGET {
            let event = match self.task_rx.try_recv() {
                Ok(event) => event,
                Err(_) => break,
            };
            processed += 1;

            match self.pending.get(&event.kind) {
                Some(pending) if pending.seq == event.seq => {
                    self.pending.remove(&event.kind);
                    self.apply(event.payload);
                }
                _ => {
                    tracing::debug!(kind = ?event.kind, "dropping superseded task completion");
                }
            }
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusLine {
            kind,
            text: text.into(),
            remaining: STATUS_TTL,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Switch screens. First visits trigger the screen's lazy fetches.
    pub fn open(&mut self, screen: Screen) {
        self.home.sos_armed = false;
        self.screen = screen;
        match screen {
            Screen::Journal => {
                if !self.journal.loaded && !self.journal.loading {
                    self.fetch_journals();
                }
            }
            Screen::Quiz => {
                if !self.quiz.scores_loaded {
                    self.fetch_quiz_scores();
                }
                // Auto-generate only once the corpus is known; a bare
                // keypress can retry before then.
                if self.quiz.questions.is_empty() && !self.quiz.loading && self.journal.loaded {
                    self.start_quiz();
                }
            }
            Screen::Cards => {
                if self.cards.deck.is_empty() && !self.cards.loading && self.journal.loaded {
                    self.draw_cards();
                }
            }
            Screen::Breathe => {
                if !self.breathe.sessions_loaded {
                    self.fetch_sessions();
                }
            }
            Screen::Map => {
                if !self.map.loaded && !self.map.loading {
                    self.refresh_points();
                }
            }
            Screen::Reminders => {
                if !self.reminders.loaded && !self.reminders.loading {
                    self.fetch_reminders();
                }
            }
            Screen::Home | Screen::Puzzle | Screen::Chat => {}
        }
    }

    pub fn go_home(&mut self) {
        self.open(Screen::Home);
    }

    pub fn menu_previous(&mut self) {
        self.home.sos_armed = false;
        self.home.selected = self.home.selected.saturating_sub(1);
    }

    pub fn menu_next(&mut self) {
        self.home.sos_armed = false;
        self.home.selected = (self.home.selected + 1).min(Screen::MENU.len() - 1);
    }

    pub fn open_selected(&mut self) {
        self.open(Screen::MENU[self.home.selected]);
    }

    // ------------------------------------------------------------------
    // Name editing
    // ------------------------------------------------------------------

    pub fn start_name_edit(&mut self) {
        self.home.sos_armed = false;
        self.home.editing_name = true;
        let current = self.profile.user_name.clone();
        self.home.name_draft.set_text(current);
    }

    pub fn cancel_name_edit(&mut self) {
        self.home.editing_name = false;
        self.home.name_draft.clear();
    }

    /// Apply and persist the typed name. Persistence failures keep the
    /// in-memory name and surface a status.
    pub fn submit_user_name(&mut self) {
        let name = self.home.name_draft.text().trim().to_string();
        if name.is_empty() {
            return;
        }
        self.home.editing_name = false;
        self.home.name_draft.clear();
        self.profile.user_name.clone_from(&name);
        match RecallConfig::persist_user_name(&name) {
            Ok(()) => {
                self.set_status(StatusKind::Success, format!("Nice to meet you, {name}!"));
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to persist user name");
                self.set_status(
                    StatusKind::Error,
                    "Couldn't save your name for next time, but I'll remember it for now.",
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------

    pub fn fetch_journals(&mut self) {
        self.journal.loading = true;
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::Journals, async move {
            TaskPayload::Journals(api.journals(&user_id).await)
        });
    }

    /// Append the drafted entry. The draft is only cleared once the
    /// backend confirms, so a failed save never eats the text.
    pub fn submit_journal_entry(&mut self) {
        if self.journal.saving {
            return;
        }
        let text = self.journal.draft.text().trim().to_string();
        if text.is_empty() {
            return;
        }
        self.journal.saving = true;
        let entry = JournalEntry::new(text, Utc::now());
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::SaveJournal, async move {
            TaskPayload::JournalSaved(api.append_journal(&user_id, &entry).await)
        });
    }

    // ------------------------------------------------------------------
    // Quiz
    // ------------------------------------------------------------------

    /// Generate a fresh quiz from the journal corpus. Supersedes any
    /// generation already in flight.
    pub fn start_quiz(&mut self) {
        if !self.journal.loaded {
            if !self.journal.loading {
                self.fetch_journals();
            }
            self.set_status(
                StatusKind::Info,
                "Still gathering your memories. Try again in a moment.",
            );
            return;
        }
        if self.journal.entries.is_empty() {
            self.set_status(
                StatusKind::Info,
                "Write a journal entry first, then I can quiz you on it.",
            );
            return;
        }
        self.quiz.loading = true;
        let api = self.api.clone();
        let journals = self.journal.entries.clone();
        let user_name = self.profile.user_name.clone();
        self.spawn_task(TaskKind::Quiz, async move {
            TaskPayload::Quiz(api.generate_quiz(&journals, &user_name).await)
        });
    }

    fn fetch_quiz_scores(&mut self) {
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::Scores, async move {
            TaskPayload::Scores(api.quiz_scores(&user_id).await)
        });
    }

    /// Answer the current question. The first choice locks in and
    /// reveals the explanation.
    pub fn choose_quiz_option(&mut self, choice: usize) {
        if self.quiz.revealed {
            return;
        }
        let Some(question) = self.quiz.questions.get(self.quiz.current) else {
            return;
        };
        if choice >= question.options().len() {
            return;
        }
        self.quiz.selected[self.quiz.current] = Some(choice);
        self.quiz.revealed = true;
    }

    /// Move past a revealed question. Finishing the last one records the
    /// score exactly once.
    pub fn next_quiz_question(&mut self) {
        if !self.quiz.revealed {
            return;
        }
        self.quiz.current += 1;
        self.quiz.revealed = false;
        if self.quiz.is_finished() && !self.quiz.score_recorded {
            self.quiz.score_recorded = true;
            self.record_quiz_score();
        }
    }

    fn record_quiz_score(&mut self) {
        let score = QuizScore {
            score: self.quiz.correct_count() as u32,
            total: self.quiz.questions.len() as u32,
            created_at: Utc::now(),
        };
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::SaveScore, async move {
            TaskPayload::ScoreSaved(api.append_quiz_score(&user_id, &score).await)
        });
    }

    // ------------------------------------------------------------------
    // Puzzle
    // ------------------------------------------------------------------

    pub fn new_puzzle(&mut self) {
        self.puzzle = PuzzleState::new(self.ui.ascii_only);
    }

    pub fn move_puzzle_cursor(&mut self, dx: isize, dy: isize) {
        let len = self.puzzle.board.cells().len();
        if len == 0 {
            return;
        }
        let columns = PUZZLE_COLUMNS as isize;
        let rows = (len as isize + columns - 1) / columns;
        let pos = self.puzzle.cursor as isize;
        let row = (pos / columns + dy).clamp(0, rows - 1);
        let col = (pos % columns + dx).clamp(0, columns - 1);
        let moved = (row * columns + col).min(len as isize - 1);
        self.puzzle.cursor = moved as usize;
    }

    pub fn select_puzzle_cell(&mut self) {
        let index = self.puzzle.cursor;
        self.puzzle.board.select(index);
    }

    // ------------------------------------------------------------------
    // Cards
    // ------------------------------------------------------------------

    /// Generate a fresh card deck from the journal corpus.
    pub fn draw_cards(&mut self) {
        if !self.journal.loaded {
            if !self.journal.loading {
                self.fetch_journals();
            }
            self.set_status(
                StatusKind::Info,
                "Still gathering your memories. Try again in a moment.",
            );
            return;
        }
        if self.journal.entries.is_empty() {
            self.set_status(
                StatusKind::Info,
                "Write a journal entry first, then I can make cards from it.",
            );
            return;
        }
        self.cards.loading = true;
        let api = self.api.clone();
        let journals = self.journal.entries.clone();
        self.spawn_task(TaskKind::Cards, async move {
            TaskPayload::Cards(api.generate_flashcards(&journals).await)
        });
    }

    /// Record the rendered card width so key presses can be scaled into
    /// gesture distances.
    pub fn set_card_width(&mut self, width: f32) {
        self.cards.width = width.max(1.0);
    }

    pub fn next_card(&mut self) {
        let width = self.cards.width;
        self.cards.deck.next(width);
        self.settle_deck_if_reduced();
    }

    pub fn previous_card(&mut self) {
        let width = self.cards.width;
        self.cards.deck.previous(width);
        self.settle_deck_if_reduced();
    }

    /// Drag the card sideways by one step; positive steps push it toward
    /// the next card.
    pub fn nudge_card(&mut self, steps: f32) {
        let dx = steps * self.cards.width * CARD_NUDGE_RATIO;
        self.cards.deck.drag_by(dx, 0.0);
    }

    /// Let go of a dragged card; it commits past the swipe threshold and
    /// snaps back otherwise.
    pub fn release_card(&mut self) {
        let width = self.cards.width;
        self.cards.deck.release(width);
        self.settle_deck_if_reduced();
    }

    fn settle_deck_if_reduced(&mut self) {
        if self.ui.reduced_motion {
            self.cards.deck.advance(COMMIT_DURATION.max(CANCEL_DURATION));
        }
    }

    // ------------------------------------------------------------------
    // Breathing
    // ------------------------------------------------------------------

    pub fn toggle_breathing(&mut self) {
        if self.breathe.timer.is_running() {
            self.breathe.timer.pause();
        } else {
            self.breathe.timer.start(Utc::now());
        }
    }

    pub fn reset_breathing(&mut self) {
        self.breathe.timer.reset();
    }

    fn fetch_sessions(&mut self) {
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::Sessions, async move {
            TaskPayload::Sessions(api.meditation_sessions(&user_id).await)
        });
    }

    /// Record the paused session. The completion is tagged with the
    /// timer generation; if the timer moved on before it lands, the
    /// session list still updates but the timer is left alone.
    pub fn save_breathing_session(&mut self) {
        if self.breathe.saving || self.breathe.timer.is_running() {
            return;
        }
        if !self.breathe.timer.can_save() {
            self.set_status(StatusKind::Info, "Breathe for a little while first.");
            return;
        }
        self.breathe.saving = true;
        let generation = self.breathe.timer.generation();
        let session = MeditationSession {
            seconds: self.breathe.timer.seconds(),
            started_at: self.breathe.timer.started_at().unwrap_or_else(Utc::now),
        };
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::SaveSession, async move {
            TaskPayload::SessionSaved {
                generation,
                result: api.append_meditation_session(&user_id, &session).await,
            }
        });
    }

    // ------------------------------------------------------------------
    // Map
    // ------------------------------------------------------------------

    pub fn refresh_points(&mut self) {
        self.map.loading = true;
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::Points, async move {
            TaskPayload::Points(api.known_points(&user_id).await)
        });
    }

    pub fn start_location_edit(&mut self, role: GeoRole) {
        self.map.editing = Some(role);
        let existing = match role {
            GeoRole::Current => self.map.points.current,
            GeoRole::Saved => self.map.points.saved,
            GeoRole::Home => self.map.points.home,
        };
        let text = existing
            .map(|point| format!("{}, {}", point.latitude, point.longitude))
            .unwrap_or_default();
        self.map.draft.set_text(text);
    }

    pub fn cancel_location_edit(&mut self) {
        self.map.editing = None;
        self.map.draft.clear();
    }

    /// Parse the typed coordinates and store them under the role being
    /// edited.
    pub fn submit_location(&mut self) {
        let Some(role) = self.map.editing else {
            return;
        };
        if self.map.saving.is_some() {
            return;
        }
        let Some(point) = parse_coordinates(self.map.draft.text()) else {
            self.set_status(
                StatusKind::Error,
                "Coordinates look like \"12.97, 77.59\" (latitude, longitude).",
            );
            return;
        };
        self.map.editing = None;
        self.map.draft.clear();
        self.map.saving = Some(role);
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::SaveLocation, async move {
            TaskPayload::LocationSaved {
                role,
                point,
                result: api.save_location(&user_id, role, point).await,
            }
        });
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    /// One companion turn: push the user's message and request a reply
    /// with the full visible transcript.
    pub fn send_chat_message(&mut self) {
        if self.chat.waiting {
            return;
        }
        let text = self.chat.draft.text().trim().to_string();
        if text.is_empty() {
            return;
        }
        self.chat.draft.clear();
        self.chat.messages.push(ChatMessage::user(text));
        self.chat.waiting = true;
        let api = self.api.clone();
        let messages = self.chat.messages.clone();
        let user_name = self.profile.user_name.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::Chat, async move {
            TaskPayload::Chat(api.chat(&messages, &user_name, &user_id).await)
        });
    }

    // ------------------------------------------------------------------
    // Reminders
    // ------------------------------------------------------------------

    fn fetch_reminders(&mut self) {
        self.reminders.loading = true;
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::Reminders, async move {
            TaskPayload::Reminders(api.reminders(&user_id).await)
        });
    }

    /// Send the typed text for reminder extraction. The draft survives
    /// until a reminder is actually heard, so rephrasing is cheap.
    pub fn submit_reminder_text(&mut self) {
        if self.reminders.analyzing {
            return;
        }
        let text = self.reminders.draft.text().trim().to_string();
        if text.is_empty() {
            return;
        }
        self.reminders.analyzing = true;
        let api = self.api.clone();
        self.spawn_task(TaskKind::ExtractReminder, async move {
            TaskPayload::ReminderExtracted(api.extract_reminder(&text).await)
        });
    }

    pub fn confirm_reminder(&mut self) {
        if self.reminders.saving {
            return;
        }
        let Some(draft) = self.reminders.pending.take() else {
            return;
        };
        self.reminders.saving = true;
        let reminder = Reminder {
            date: draft.date,
            time: draft.time,
            message: draft.message,
            created_at: Some(Utc::now()),
            called_at: None,
        };
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.spawn_task(TaskKind::SaveReminder, async move {
            TaskPayload::ReminderSaved(api.append_reminder(&user_id, &reminder).await)
        });
    }

    pub fn discard_reminder(&mut self) {
        self.reminders.pending = None;
    }

    // ------------------------------------------------------------------
    // SOS and liveness
    // ------------------------------------------------------------------

    /// Two-step alert: the first press arms, the second one sends. Any
    /// navigation in between disarms.
    pub fn press_sos(&mut self) {
        if !self.home.sos_armed {
            self.home.sos_armed = true;
            self.set_status(StatusKind::Info, "Press S again to send an alert.");
            return;
        }
        self.home.sos_armed = false;
        let point = self.map.points.current.or(self.map.points.saved);
        let api = self.api.clone();
        let user_id = self.profile.user_id.clone();
        self.set_status(StatusKind::Info, "Sending the alert...");
        self.spawn_task(TaskKind::Sos, async move {
            TaskPayload::SosSent(api.send_sos(&user_id, point).await)
        });
    }

    pub fn cancel_sos(&mut self) {
        self.home.sos_armed = false;
    }

    fn check_health(&mut self) {
        let api = self.api.clone();
        self.spawn_task(TaskKind::Health, async move {
            TaskPayload::Health(api.health().await)
        });
    }

    // ------------------------------------------------------------------
    // Task completion handling
    // ------------------------------------------------------------------

    fn spawn_task<F>(&mut self, kind: TaskKind, task: F)
    where
        F: Future<Output = TaskPayload> + Send + 'static,
    {
        self.next_seq += 1;
        let seq = self.next_seq;
        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        if let Some(previous) = self.pending.insert(kind, PendingTask { seq, abort_handle }) {
            previous.abort_handle.abort();
        }

        let tx = self.task_tx.clone();
        let task = async move {
            let payload = task.await;
            let _ = tx.send(TaskEvent { kind, seq, payload });
        };
        tokio::spawn(async move {
            let _ = Abortable::new(task, abort_registration).await;
        });
    }

    fn mark_reachable(&mut self) {
        self.backend_ok = Some(true);
    }

    fn report_error(&mut self, what: &str, err: &ApiError) {
        tracing::warn!(error = %err, "{what} failed");
        if err.is_connectivity() {
            self.backend_ok = Some(false);
        }
        let text = match err {
            ApiError::Status { status, .. } => format!("{what} failed (the server said {status})."),
            ApiError::Connection { .. } => format!("{what} failed; I can't reach the server."),
            ApiError::Request(_) => format!("{what} failed."),
        };
        self.set_status(StatusKind::Error, text);
    }

    fn apply(&mut self, payload: TaskPayload) {
        match payload {
            TaskPayload::Health(result) => match result {
                Ok(()) => self.mark_reachable(),
                Err(err) => {
                    tracing::warn!(error = %err, "health check failed");
                    self.backend_ok = Some(false);
                }
            },
            TaskPayload::Journals(result) => {
                self.journal.loading = false;
                match result {
                    Ok(entries) => {
                        self.journal.entries = entries;
                        self.journal.loaded = true;
                        self.mark_reachable();
                    }
                    Err(err) => self.report_error("Loading your memories", &err),
                }
            }
            TaskPayload::JournalSaved(result) => {
                self.journal.saving = false;
                match result {
                    Ok(entries) => {
                        self.journal.entries = entries;
                        self.journal.loaded = true;
                        self.journal.draft.clear();
                        self.mark_reachable();
                        self.set_status(StatusKind::Success, "Memory saved.");
                    }
                    Err(err) => self.report_error("Saving your memory", &err),
                }
            }
            TaskPayload::Quiz(result) => {
                self.quiz.loading = false;
                match result {
                    Ok(questions) if questions.is_empty() => {
                        self.set_status(
                            StatusKind::Info,
                            "No questions came back. Try again in a little while.",
                        );
                    }
                    Ok(questions) => {
                        self.quiz.install(questions);
                        self.mark_reachable();
                    }
                    Err(err) => self.report_error("Making your quiz", &err),
                }
            }
            TaskPayload::Scores(result) => match result {
                Ok(scores) => {
                    self.quiz.past_scores = scores;
                    self.quiz.scores_loaded = true;
                }
                Err(err) => tracing::warn!(error = %err, "loading quiz scores failed"),
            },
            TaskPayload::ScoreSaved(result) => match result {
                Ok(scores) => {
                    self.quiz.past_scores = scores;
                    self.quiz.scores_loaded = true;
                    self.set_status(StatusKind::Success, "Quiz finished. Score saved.");
                }
                Err(err) => self.report_error("Saving your score", &err),
            },
            TaskPayload::Cards(result) => {
                self.cards.loading = false;
                match result {
                    Ok(cards) if cards.is_empty() => {
                        self.set_status(StatusKind::Info, "No cards this time. Try again soon.");
                    }
                    Ok(cards) => {
                        self.cards.deck.reload(cards);
                        self.mark_reachable();
                    }
                    Err(err) => self.report_error("Making your cards", &err),
                }
            }
            TaskPayload::Chat(result) => {
                self.chat.waiting = false;
                match result {
                    Ok(reply) => {
                        let text = sanitize_display_text(&reply.reply).trim().to_string();
                        if text.is_empty() {
                            self.set_status(StatusKind::Info, "No reply this time.");
                        } else {
                            self.chat.messages.push(ChatMessage::assistant(text));
                        }
                        self.chat.title = reply
                            .title
                            .as_deref()
                            .map(|title| sanitize_display_text(title).trim().to_string())
                            .filter(|title| !title.is_empty());
                        self.mark_reachable();
                    }
                    Err(err) => self.report_error("The companion", &err),
                }
            }
            TaskPayload::Sessions(result) => match result {
                Ok(sessions) => {
                    self.breathe.sessions = sessions;
                    self.breathe.sessions_loaded = true;
                }
                Err(err) => tracing::warn!(error = %err, "loading breathing sessions failed"),
            },
            TaskPayload::SessionSaved { generation, result } => {
                self.breathe.saving = false;
                match result {
                    Ok(sessions) => {
                        self.breathe.sessions = sessions;
                        self.mark_reachable();
                        self.set_status(StatusKind::Success, "Breathing session saved.");
                        // Only a timer that has not moved on gets reset.
                        if generation == self.breathe.timer.generation()
                            && !self.breathe.timer.is_running()
                        {
                            self.breathe.timer.reset();
                        } else {
                            tracing::debug!("session save landed after the timer moved on");
                        }
                    }
                    Err(err) => self.report_error("Saving the session", &err),
                }
            }
            TaskPayload::Reminders(result) => {
                self.reminders.loading = false;
                match result {
                    Ok(reminders) => {
                        self.reminders.reminders = reminders;
                        self.reminders.loaded = true;
                        self.mark_reachable();
                    }
                    Err(err) => self.report_error("Loading reminders", &err),
                }
            }
            TaskPayload::ReminderExtracted(result) => {
                self.reminders.analyzing = false;
                match result {
                    Ok(Some(draft)) => {
                        self.reminders.pending = Some(draft);
                        self.reminders.draft.clear();
                        self.mark_reachable();
                    }
                    Ok(None) => {
                        self.set_status(
                            StatusKind::Info,
                            "I didn't hear a reminder in that. Try adding a day and a time.",
                        );
                    }
                    Err(err) => self.report_error("Understanding the reminder", &err),
                }
            }
            TaskPayload::ReminderSaved(result) => {
                self.reminders.saving = false;
                match result {
                    Ok(reminders) => {
                        self.reminders.reminders = reminders;
                        self.reminders.loaded = true;
                        self.mark_reachable();
                        self.set_status(StatusKind::Success, "Reminder saved.");
                    }
                    Err(err) => self.report_error("Saving the reminder", &err),
                }
            }
            TaskPayload::Points(result) => {
                self.map.loading = false;
                match result {
                    Ok(points) => {
                        self.map.points = points;
                        self.map.loaded = true;
                        self.mark_reachable();
                    }
                    Err(err) => self.report_error("Loading your places", &err),
                }
            }
            TaskPayload::LocationSaved {
                role,
                point,
                result,
            } => {
                self.map.saving = None;
                match result {
                    Ok(()) => {
                        match role {
                            GeoRole::Current => self.map.points.current = Some(point),
                            GeoRole::Saved => self.map.points.saved = Some(point),
                            GeoRole::Home => self.map.points.home = Some(point),
                        }
                        self.mark_reachable();
                        self.set_status(
                            StatusKind::Success,
                            format!("{} location saved.", role_label(role)),
                        );
                    }
                    Err(err) => self.report_error("Saving the location", &err),
                }
            }
            TaskPayload::SosSent(result) => match result {
                Ok(()) => {
                    self.mark_reachable();
                    self.set_status(StatusKind::Success, "Alert sent. Help is on the way.");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "sos alert failed");
                    if err.is_connectivity() {
                        self.backend_ok = Some(false);
                    }
                    self.set_status(
                        StatusKind::Error,
                        "The alert didn't go through. Please call someone you trust.",
                    );
                }
            },
        }
    }
}

fn role_label(role: GeoRole) -> &'static str {
    match role {
        GeoRole::Current => "Current",
        GeoRole::Saved => "Saved",
        GeoRole::Home => "Home",
    }
}

/// Parse "lat, lon" typed by hand. Both halves must be finite numbers
/// within WGS84 bounds.
fn parse_coordinates(input: &str) -> Option<GeoPoint> {
    let (lat, lon) = input.split_once(',')?;
    let latitude: f64 = lat.trim().parse().ok()?;
    let longitude: f64 = lon.trim().parse().ok()?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some(GeoPoint::new(latitude, longitude))
}
