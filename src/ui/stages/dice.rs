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

// Pip layout on a 3x3 grid, row-major.
const PIPS: [[bool; 9]; 6] = [
    [false, false, false, false, true, false, false, false, false],
    [true, false, false, false, false, false, false, false, true],
    [true, false, false, false, true, false, false, false, true],
    [true, false, true, false, false, false, true, false, true],
    [true, false, true, false, true, false, true, false, true],
    [true, false, true, true, false, true, true, false, true],
];

/// Text art of a die showing `face` (1 to 6).
pub fn die_face(face: u8) -> Vec<String> {
    let pips = PIPS[(face.clamp(1, 6) - 1) as usize];
    let mut lines = vec!["┌───────────┐".to_string()];
    for row in pips.chunks(3) {
        let cells: Vec<&str> = row.iter().map(|&on| if on { "●" } else { " " }).collect();
        lines.push(format!("│  {}  {}  {}  │", cells[0], cells[1], cells[2]));
    }
    lines.push("└───────────┘".to_string());
    lines
}

pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme, now: Instant) {
    let block = Block::default()
        .title(" Dice ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(5), // Die
            Constraint::Length(2),
            Constraint::Length(3), // Progress or result
            Constraint::Min(0),
        ])
        .split(inner);

    let reveal = app.state.reveal();
    let face = reveal.map(|r| r.face).unwrap_or(6);
    let die: Vec<Line> = die_face(face).into_iter().map(Line::from).collect();
    let die = Paragraph::new(die)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD));
    f.render_widget(die, chunks[1]);

    if let Some(reveal) = reveal {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.accent).bg(theme.background))
            .ratio(reveal.progress(now))
            .label("Rolling...");
        f.render_widget(gauge, chunks[3]);
    } else {
        let caption = app
            .state
            .result
            .as_ref()
            .map(|r| r.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Press Space to roll".to_string());
        let text = Paragraph::new(caption)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.accent_2).add_modifier(Modifier::BOLD));
        f.render_widget(text, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_show_matching_pip_count() {
        for face in 1..=6u8 {
            let art = die_face(face);
            assert_eq!(art.len(), 5);
            let pips: usize = art.iter().map(|line| line.matches('●').count()).sum();
            assert_eq!(pips, face as usize);
        }
    }

    #[test]
    fn out_of_range_faces_are_clamped() {
        assert_eq!(die_face(0), die_face(1));
        assert_eq!(die_face(9), die_face(6));
    }
}
