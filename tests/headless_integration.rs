use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use abagames::app::{App, AppAction, AppState};
use abagames::config::Settings;
use abagames::cues::Cue;
use abagames::i18n::Catalog;
use abagames::round::Round;
use abagames::runtime::{AppEvent, Runner, TestEventSource};
use abagames::session::{REWARD_DURATION, REWARD_COMPLETE_DELAY};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};

// Headless integration using the internal runtime + App without a TTY.
// Events go through the same Runner/TestEventSource path the binary uses;
// ticks are injected so reward windows pass instantly.
struct Harness {
    tx: Sender<AppEvent>,
    runner: Runner<TestEventSource>,
    app: App,
}

impl Harness {
    fn new(settings: Settings) -> Self {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(5));
        let app = App::new(Catalog::load().unwrap(), settings, Some(42));
        Self { tx, runner, app }
    }

    fn send(&mut self, event: AppEvent) -> AppAction {
        self.tx.send(event).unwrap();
        match self.runner.step() {
            AppEvent::Key(key) => self.app.on_key(key),
            AppEvent::Tick(elapsed) => {
                self.app.on_tick(elapsed);
                AppAction::Continue
            }
            AppEvent::Resize => AppAction::Continue,
        }
    }

    fn key(&mut self, code: KeyCode) -> AppAction {
        self.send(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn keys(&mut self, code: KeyCode, times: usize) {
        for _ in 0..times {
            self.key(code);
        }
    }

    fn tick(&mut self, elapsed: Duration) {
        self.send(AppEvent::Tick(elapsed));
    }

    fn round(&self) -> Round {
        self.app.view.as_ref().unwrap().round.clone()
    }
}

#[test]
fn headless_counting_game_reaches_result() {
    let mut h = Harness::new(Settings::default());
    h.key(KeyCode::Enter);
    assert_eq!(h.app.state, AppState::Playing);

    for round_index in 0..8 {
        let Round::Counting(round) = h.round() else {
            panic!("expected a counting round");
        };
        assert_eq!(round.round_index, round_index);
        let digit = char::from_digit(round.count, 10).unwrap();
        h.key(KeyCode::Char(digit));
        assert_eq!(h.app.view.as_ref().unwrap().score, round_index + 1);
        h.tick(REWARD_DURATION);
    }

    assert_eq!(h.app.state, AppState::Result);
    assert!(h.app.view.as_ref().unwrap().is_perfect());

    h.key(KeyCode::Enter);
    assert_eq!(h.app.state, AppState::Playing);
    let view = h.app.view.as_ref().unwrap();
    assert_eq!((view.round_index, view.score), (0, 0));

    h.key(KeyCode::Esc);
    assert_eq!(h.app.state, AppState::Home);
    assert_eq!(h.key(KeyCode::Char('q')), AppAction::Quit);
}

#[test]
fn headless_reverse_counting_with_cursor() {
    let mut h = Harness::new(Settings::default());
    h.key(KeyCode::Char('2'));
    let Round::ReverseCounting(round) = h.round() else {
        panic!("expected a reverse counting round");
    };

    h.tick(Duration::from_millis(1_000));
    assert!(h.app.caption.as_deref().unwrap().starts_with("Montre-moi"));

    let slot = round.correct_choice_id.slot;
    h.keys(KeyCode::Right, slot);
    assert_eq!(h.app.answer_cursor, slot);
    h.key(KeyCode::Enter);

    let view = h.app.view.as_ref().unwrap();
    assert_eq!(view.score, 1);
    assert!(view.is_locked);
    assert!(h.app.last_cue.is_none());

    h.tick(Duration::from_millis(900));
    assert!(matches!(h.app.last_cue, Some(Cue::Reward(_))));
    assert!(h.app.celebration.is_active);

    h.tick(REWARD_DURATION);
    assert_eq!(h.app.view.as_ref().unwrap().round_index, 1);
    assert_eq!(h.app.answer_cursor, 0);
}

#[test]
fn headless_letter_colouring_unlocks_next_round() {
    let mut h = Harness::new(Settings::default());
    h.key(KeyCode::Char('3'));
    let Round::Letter(round) = h.round() else {
        panic!("expected a letter round");
    };

    h.key(KeyCode::Char(round.target_letter.to_ascii_lowercase()));
    assert!(h.app.coloring.is_some());

    // Park the brush in the top-left corner, then sweep the canvas.
    h.keys(KeyCode::Left, 13);
    h.keys(KeyCode::Up, 13);
    h.key(KeyCode::Char(' '));
    for row in 0..13 {
        let across = if row % 2 == 0 { KeyCode::Right } else { KeyCode::Left };
        h.keys(across, 25);
        h.keys(KeyCode::Down, 2);
    }
    h.key(KeyCode::Char(' '));

    let pad = h.app.coloring.as_ref().unwrap();
    assert!(pad.board.is_complete());
    assert!(h.app.last_cue.is_none());

    h.tick(REWARD_COMPLETE_DELAY);
    assert_eq!(h.app.last_cue, Some(Cue::SuccessJingle));

    h.tick(REWARD_DURATION);
    assert_eq!(h.app.view.as_ref().unwrap().round_index, 1);
    assert!(h.app.coloring.is_none());
}

#[test]
fn headless_frames_render_for_every_screen() {
    let mut h = Harness::new(Settings::default());
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    terminal.draw(|f| f.render_widget(&h.app, f.area())).unwrap();
    for game in ['1', '2', '3'] {
        h.key(KeyCode::Char(game));
        h.tick(Duration::from_secs(12));
        terminal.draw(|f| f.render_widget(&h.app, f.area())).unwrap();
        h.key(KeyCode::Esc);
    }

    h.key(KeyCode::Char('l'));
    terminal.draw(|f| f.render_widget(&h.app, f.area())).unwrap();
    let rendered: String = terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(rendered.contains("How many?"));
}
