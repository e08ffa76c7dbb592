use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::App;
use crate::ui::theme::Theme;
use crate::ui::widgets::wheel_canvas;

pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let names = &app.state.names_wheel;
    let questions = &app.state.question_wheel;

    let names_title = if names.is_spinning() {
        " Names (spinning) ".to_string()
    } else {
        format!(" Names ({}) ", names.items().len())
    };
    let names_block = Block::default()
        .title(names_title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));
    wheel_canvas::render(
        f,
        chunks[0],
        names.surface(),
        names_block,
        theme.background,
        theme.accent,
    );

    let questions_title = if questions.items().is_empty() {
        " Questions (no file) ".to_string()
    } else {
        format!(" Questions ({}) ", questions.items().len())
    };
    let questions_block = Block::default()
        .title(questions_title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent_2));
    wheel_canvas::render(
        f,
        chunks[1],
        questions.surface(),
        questions_block,
        theme.background,
        theme.accent_2,
    );
}
