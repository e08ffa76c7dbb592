use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use std::time::Instant;

use crate::app::App;
use crate::ui::theme::Theme;

const CLOSED: [&str; 5] = [
    "  ___________  ",
    " /           \\ ",
    "|=====[o]=====|",
    "|             |",
    "|_____________|",
];

const OPEN: [&str; 5] = [
    " /‾‾‾‾‾‾‾‾‾‾‾\\ ",
    "|  * * * * *  |",
    "|=============|",
    "|             |",
    "|_____________|",
];

/// Chest art: the lid lifts once the opening passes halfway.
pub fn chest_art(progress: f64) -> &'static [&'static str; 5] {
    if progress >= 0.5 {
        &OPEN
    } else {
        &CLOSED
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme, now: Instant) {
    let block = Block::default()
        .title(" Treasure Chest ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(5), // Chest
            Constraint::Length(2),
            Constraint::Length(3), // Progress or result
            Constraint::Min(0),
        ])
        .split(inner);

    let reveal = app.state.reveal();
    let progress = match (reveal, app.state.result.is_some()) {
        (Some(reveal), _) => reveal.progress(now),
        (None, true) => 1.0,
        (None, false) => 0.0,
    };
    let art: Vec<Line> = chest_art(progress).iter().map(|l| Line::from(*l)).collect();
    let chest = Paragraph::new(art)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.accent_2).add_modifier(Modifier::BOLD));
    f.render_widget(chest, chunks[1]);

    if let Some(reveal) = reveal {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.accent_2).bg(theme.background))
            .ratio(reveal.progress(now))
            .label("Opening...");
        f.render_widget(gauge, chunks[3]);
    } else {
        let caption = app
            .state
            .result
            .as_ref()
            .map(|r| r.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Press Space to open".to_string());
        let text = Paragraph::new(caption)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD));
        f.render_widget(text, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lid_opens_halfway() {
        assert_eq!(chest_art(0.0), &CLOSED);
        assert_eq!(chest_art(0.49), &CLOSED);
        assert_eq!(chest_art(0.5), &OPEN);
        assert_eq!(chest_art(1.0), &OPEN);
    }
}
