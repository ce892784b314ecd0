use crossterm::event::KeyEvent;
use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, AppAction, ScreenKind};
use crate::ui::{quiz::QuizScreen, setup::SetupScreen};

/// A UI Screen boundary: responsible for rendering and key handling
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
    fn on_key(&self, key: KeyEvent, app: &mut App) -> AppAction;
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(kind: ScreenKind) -> Box<dyn Screen> {
    match kind {
        ScreenKind::Setup => Box::new(SetupScreen),
        ScreenKind::Quiz => Box::new(QuizScreen),
    }
}
