use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, AppState};

use super::{render_game, render_home, render_result};

/// A UI Screen boundary: draws one application state
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Game picker
pub struct HomeScreen;

impl Screen for HomeScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_home(app, area, buf);
    }
}

/// Running round: sprites, answers, feedback, captions
pub struct GameScreen;

impl Screen for GameScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_game(app, area, buf);
    }
}

/// Score after the last round
pub struct ResultScreen;

impl Screen for ResultScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_result(app, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Home => Box::new(HomeScreen),
        AppState::Playing => Box::new(GameScreen),
        AppState::Result => Box::new(ResultScreen),
    }
}
