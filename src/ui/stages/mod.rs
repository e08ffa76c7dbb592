pub mod chest;
pub mod dice;
pub mod wheel;

use ratatui::{layout::Rect, Frame};
use std::time::Instant;

use crate::app::{App, PickMode};
use crate::ui::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme, now: Instant) {
    match app.state.mode {
        PickMode::Wheel => wheel::render(f, area, app, theme),
        PickMode::Dice => dice::render(f, area, app, theme, now),
        PickMode::Chest => chest::render(f, area, app, theme, now),
    }
}
