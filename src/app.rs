//! Terminal front-end state: which screen is up, the running session, and
//! the presentation-only extras (captions, confetti, colouring pad).

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};

use crate::celebration::CelebrationAnimation;
use crate::coloring::{ColoringBoard, Point};
use crate::config::Settings;
use crate::cues::{Cue, CueLog, CueRecord};
use crate::i18n::{Catalog, Language, Texts};
use crate::random::RandomSource;
use crate::round::{Answer, Round};
use crate::rules::{CountingGame, GameKind, LetterListeningGame, ReverseCountingGame};
use crate::session::{
    DifficultyConfig, GameSession, SessionControl, SessionEvent, SessionView, REWARD_DURATION,
};

/// Brush movement per arrow key, in colouring-board units.
pub const BRUSH_STEP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Home,
    Playing,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// Boxes a session for `kind`, wired to `cues` for both speech and audio.
pub fn build_session(
    kind: GameKind,
    config: DifficultyConfig,
    texts: &Texts,
    rng: Box<dyn RandomSource>,
    cues: &CueLog,
) -> Box<dyn SessionControl> {
    let texts = texts.clone();
    let speaker = Box::new(cues.clone());
    let audio = Box::new(cues.clone());
    match kind {
        GameKind::Counting => Box::new(GameSession::new(
            CountingGame,
            config,
            texts,
            rng,
            speaker,
            audio,
        )),
        GameKind::ReverseCounting => Box::new(GameSession::new(
            ReverseCountingGame,
            config,
            texts,
            rng,
            speaker,
            audio,
        )),
        GameKind::LetterListening => Box::new(GameSession::new(
            LetterListeningGame,
            config,
            texts,
            rng,
            speaker,
            audio,
        )),
    }
}

#[derive(Debug, Clone)]
pub struct ColoringPad {
    pub board: ColoringBoard,
    pub cursor: Point,
    pub pen_down: bool,
}

impl ColoringPad {
    fn new(board: ColoringBoard) -> Self {
        Self {
            board,
            cursor: Point::new(50.0, 50.0),
            pen_down: false,
        }
    }
}

pub struct App {
    catalog: Catalog,
    pub settings: Settings,
    pub language: Language,
    pub state: AppState,
    pub selected_game: usize,
    pub session: Option<Box<dyn SessionControl>>,
    pub view: Option<SessionView>,
    pub answer_cursor: usize,
    pub cues: CueLog,
    /// Last thing spoken, shown as a caption.
    pub caption: Option<String>,
    pub last_cue: Option<Cue>,
    pub celebration: CelebrationAnimation,
    pub coloring: Option<ColoringPad>,
    pub viewport: (u16, u16),
    rng: StdRng,
}

impl App {
    pub fn new(catalog: Catalog, settings: Settings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            catalog,
            language: settings.language,
            settings,
            state: AppState::Home,
            selected_game: 0,
            session: None,
            view: None,
            answer_cursor: 0,
            cues: CueLog::new(),
            caption: None,
            last_cue: None,
            celebration: CelebrationAnimation::new(REWARD_DURATION),
            coloring: None,
            viewport: (80, 24),
            rng,
        }
    }

    pub fn texts(&self) -> &Texts {
        self.catalog.texts(self.language)
    }

    pub fn selected_kind(&self) -> GameKind {
        GameKind::ALL[self.selected_game % GameKind::ALL.len()]
    }

    pub fn start_game(&mut self, kind: GameKind) {
        // Tear the old session down first so its stop calls don't leak
        // into the new caption.
        self.session = None;
        self.cues.clear();
        self.caption = None;
        self.last_cue = None;
        self.coloring = None;
        self.celebration.stop();

        let config = self.settings.difficulty(kind);
        let seed = self.rng.next_u64();
        info!(game = %kind, seed, "starting game");
        self.session = Some(build_session(
            kind,
            config,
            self.catalog.texts(self.language),
            Box::new(StdRng::seed_from_u64(seed)),
            &self.cues,
        ));
        self.state = AppState::Playing;
        self.answer_cursor = 0;
        self.refresh();
    }

    pub fn go_home(&mut self) {
        self.session = None;
        self.view = None;
        self.coloring = None;
        self.celebration.stop();
        self.cues.clear();
        self.caption = None;
        self.last_cue = None;
        self.state = AppState::Home;
    }

    pub fn toggle_language(&mut self) {
        self.language = self.language.toggled();
        self.settings.language = self.language;
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        if let Some(session) = self.session.as_mut() {
            session.tick(elapsed);
        }
        self.celebration.update(elapsed);
        self.refresh();
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }

        match self.state {
            AppState::Home => return self.on_home_key(key),
            AppState::Playing => self.on_playing_key(key),
            AppState::Result => match key.code {
                KeyCode::Enter => self.restart(),
                KeyCode::Esc => self.go_home(),
                _ => {}
            },
        }
        AppAction::Continue
    }

    pub fn submit(&mut self, answer: Answer) {
        if let Some(session) = self.session.as_mut() {
            let outcome = session.submit(answer);
            debug!(?answer, ?outcome, "submitted");
        }
        self.refresh();
    }

    pub fn restart(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.restart();
        }
        self.refresh();
    }

    fn on_home_key(&mut self, key: KeyEvent) -> AppAction {
        let games = GameKind::ALL.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Up => self.selected_game = (self.selected_game + games - 1) % games,
            KeyCode::Down => self.selected_game = (self.selected_game + 1) % games,
            KeyCode::Char('l') => self.toggle_language(),
            KeyCode::Char(c @ '1'..='3') => {
                self.selected_game = (c as usize) - ('1' as usize);
                self.start_game(self.selected_kind());
            }
            KeyCode::Enter => self.start_game(self.selected_kind()),
            _ => {}
        }
        AppAction::Continue
    }

    fn on_playing_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.go_home();
            return;
        }
        if self.coloring.is_some() {
            self.on_coloring_key(key);
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.restart();
            return;
        }

        let options = self
            .view
            .as_ref()
            .map(|view| view.options.clone())
            .unwrap_or_default();
        match key.code {
            KeyCode::Left => self.answer_cursor = self.answer_cursor.saturating_sub(1),
            KeyCode::Right => {
                self.answer_cursor = (self.answer_cursor + 1).min(options.len().saturating_sub(1))
            }
            KeyCode::Enter => {
                if let Some(answer) = options.get(self.answer_cursor).copied() {
                    self.submit(answer);
                }
            }
            KeyCode::Char(' ') => {
                if let Some(session) = self.session.as_mut() {
                    session.replay_prompt();
                }
                self.refresh();
            }
            KeyCode::Char(c) => {
                if let Some(answer) = self.shortcut_answer(c, &options) {
                    self.submit(answer);
                }
            }
            _ => {}
        }
    }

    /// Digits pick counts or choices; letters pick letters.
    fn shortcut_answer(&self, c: char, options: &[Answer]) -> Option<Answer> {
        let game = self.view.as_ref()?.game;
        match game {
            GameKind::Counting => match c {
                '0' => Some(Answer::Count(10)),
                '1'..='9' => c.to_digit(10).map(Answer::Count),
                _ => None,
            },
            GameKind::ReverseCounting => {
                let slot = c.to_digit(10)?.checked_sub(1)?;
                options.get(slot as usize).copied()
            }
            GameKind::LetterListening => c
                .is_ascii_alphabetic()
                .then(|| Answer::Letter(c.to_ascii_uppercase())),
        }
    }

    fn on_coloring_key(&mut self, key: KeyEvent) {
        let Some(pad) = self.coloring.as_mut() else {
            return;
        };
        let (dx, dy) = match key.code {
            KeyCode::Left => (-BRUSH_STEP, 0.0),
            KeyCode::Right => (BRUSH_STEP, 0.0),
            KeyCode::Up => (0.0, -BRUSH_STEP),
            KeyCode::Down => (0.0, BRUSH_STEP),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let completed = if pad.pen_down {
                    pad.pen_down = false;
                    pad.board.end_stroke()
                } else {
                    pad.pen_down = true;
                    pad.board.begin_stroke(pad.cursor);
                    false
                };
                if completed {
                    if let Some(session) = self.session.as_mut() {
                        session.complete_reward();
                    }
                    self.refresh();
                }
                return;
            }
            _ => return,
        };

        pad.cursor = Point::new(
            (pad.cursor.x + dx).clamp(0.0, 100.0),
            (pad.cursor.y + dy).clamp(0.0, 100.0),
        );
        if pad.pen_down {
            pad.board.extend_stroke(pad.cursor);
        }
    }

    /// Pulls events, cues and a fresh view out of the session.
    fn refresh(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let events = session.drain_events();
        let view = session.view();

        for event in events {
            match event {
                SessionEvent::RoundStarted { .. } => {
                    self.answer_cursor = 0;
                    self.coloring = None;
                    self.celebration.stop();
                }
                SessionEvent::Restarted => self.state = AppState::Playing,
                SessionEvent::Celebrated { .. } => {
                    let word = self.catalog.texts(self.language).common.bravo.clone();
                    let (width, height) = self.viewport;
                    self.celebration.start(&word, width, height, &mut self.rng);
                }
                SessionEvent::RewardRequested { .. } => {
                    if let Round::Letter(round) = &view.round {
                        self.coloring = ColoringBoard::new(round.target_letter).map(ColoringPad::new);
                    }
                }
                SessionEvent::Finished { score } => {
                    info!(score, "game finished");
                    self.coloring = None;
                    self.state = AppState::Result;
                }
                _ => {}
            }
        }

        for record in self.cues.take() {
            match record {
                CueRecord::Spoken { text, .. } => self.caption = Some(text),
                CueRecord::Played(cue) => self.last_cue = Some(cue),
                CueRecord::AudioStopped => self.last_cue = None,
                CueRecord::SpeechStopped => {}
            }
        }
        self.view = Some(view);
    }
}
