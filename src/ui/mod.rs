pub mod stages;
pub mod theme;
pub mod widgets;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs as RatatuiTabs, Wrap},
    Frame,
};
use std::time::Instant;

use crate::app::state::InputMode;
use crate::app::{App, PickMode};
use theme::Theme;

const NO_QUESTION: &str = "—";

pub fn render(f: &mut Frame, app: &App, now: Instant) {
    let size = f.size();
    let theme = {
        let config = app.state.config.read();
        Theme::from_config(&config, app.state.theme)
    };

    // Fill the frame so the palette background applies everywhere
    let background = Block::default()
        .style(Style::default().bg(theme.background).fg(theme.foreground));
    f.render_widget(background, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Length(3),  // Modes
            Constraint::Min(0),     // Stage and side panel
            Constraint::Length(3),  // Footer/text input
        ])
        .split(size);

    render_header(f, chunks[0], app, &theme);
    render_modes(f, chunks[1], app, &theme);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(40)])
        .split(chunks[2]);

    stages::render(f, body[0], app, &theme, now);
    render_side_panel(f, body[1], app, &theme, now);
    render_footer(f, chunks[3], app, &theme);
}

fn render_header(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let config = app.state.config.read();
    let palette = if theme.light { "light" } else { "dark" };
    let title = format!(
        "{} v{}  ·  theme: {} ({})",
        config.general.app_name,
        env!("CARGO_PKG_VERSION"),
        app.state.theme.key(),
        palette
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.muted));

    let text = Paragraph::new(title)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD));

    f.render_widget(text, area);
}

fn render_modes(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let modes = PickMode::all();
    let titles: Vec<Line> = modes.iter().map(|mode| Line::from(mode.as_str())).collect();
    let selected = modes.iter().position(|m| *m == app.state.mode).unwrap_or(0);

    let tabs = RatatuiTabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.muted)),
        )
        .select(selected)
        .style(Style::default().fg(theme.muted))
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

    f.render_widget(tabs, area);
}

fn render_side_panel(f: &mut Frame, area: Rect, app: &App, theme: &Theme, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30), // Names
            Constraint::Length(4),      // Result
            Constraint::Percentage(35), // Questions
            Constraint::Min(3),         // History
        ])
        .split(area);

    render_names(f, chunks[0], app, theme);
    render_result(f, chunks[1], app, theme, now);
    render_questions(f, chunks[2], app, theme);
    render_history(f, chunks[3], app, theme);
}

fn render_names(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let editing = app.state.input == InputMode::EditNames;
    let title = if editing {
        " Names (editing, Esc to finish) "
    } else {
        " Names "
    };
    let border = if editing { theme.accent } else { theme.muted };

    let mut lines: Vec<Line> = app
        .state
        .names_text
        .split('\n')
        .map(|line| Line::from(line.to_string()))
        .collect();
    if editing {
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
        }
    } else if app.state.names_text.trim().is_empty() {
        lines = vec![Line::from(Span::styled(
            "Press e to enter names",
            Style::default().fg(theme.muted),
        ))];
    }

    // Keep the cursor line visible while typing
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
        .scroll((scroll, 0))
        .style(Style::default().fg(theme.foreground));

    f.render_widget(paragraph, area);
}

fn render_result(f: &mut Frame, area: Rect, app: &App, theme: &Theme, now: Instant) {
    let flashing = app.state.is_flashing(now);
    let mut name_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    if flashing {
        name_style = name_style.add_modifier(Modifier::REVERSED);
    }

    let lines = match app.state.result.as_ref() {
        Some(result) => vec![
            Line::from(vec![
                Span::raw("Name: "),
                Span::styled(
                    if result.name.is_empty() { NO_QUESTION } else { result.name.as_str() },
                    name_style,
                ),
            ]),
            Line::from(vec![
                Span::raw("Question: "),
                Span::styled(
                    result.question.as_deref().unwrap_or(NO_QUESTION),
                    Style::default().fg(theme.foreground),
                ),
            ]),
        ],
        None => vec![Line::from(Span::styled(
            "No pick yet",
            Style::default().fg(theme.muted),
        ))],
    };

    let title = if app.state.can_remove_chosen() {
        " Result (d removes) "
    } else {
        " Result "
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent_2)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn render_questions(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let (title, body, style) = match (&app.state.questions, &app.state.question_error) {
        (Some(set), _) => {
            let file = set
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (
                format!(" {} ({} questions) ", file, set.len()),
                set.preview.clone(),
                Style::default().fg(theme.foreground),
            )
        }
        (None, Some(error)) => (
            " Questions ".to_string(),
            error.clone(),
            Style::default().fg(theme.danger),
        ),
        (None, None) => (
            " Questions ".to_string(),
            "No question file loaded. Press o to open a .txt or .docx file.".to_string(),
            Style::default().fg(theme.muted),
        ),
    };

    let paragraph = Paragraph::new(body)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.muted)),
        )
        .wrap(Wrap { trim: false })
        .style(style);

    f.render_widget(paragraph, area);
}

fn render_history(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let lines: Vec<Line> = app
        .state
        .history
        .get_all()
        .iter()
        .map(|record| {
            Line::from(vec![
                Span::styled(
                    record.at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(theme.muted),
                ),
                Span::styled(record.name.clone(), Style::default().fg(theme.foreground)),
                Span::styled(
                    format!(" ({})", record.mode.as_str()),
                    Style::default().fg(theme.muted),
                ),
                Span::styled(
                    record
                        .question
                        .as_deref()
                        .map(|q| format!(" {}", q))
                        .unwrap_or_default(),
                    Style::default().fg(theme.muted),
                ),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" History ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.muted)),
    );

    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let block = match app.state.notice.as_deref() {
        Some(notice) => Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.danger))
            .title(Span::styled(
                format!(" {} ", notice),
                Style::default().fg(theme.danger).add_modifier(Modifier::BOLD),
            )),
        None => Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.muted)),
    };

    let text = match &app.state.input {
        InputMode::OpenFile(path) => {
            format!("Question file: {}▏ [Enter] Load [Esc] Cancel", path)
        }
        InputMode::EditNames => {
            "Type names, one per line or comma separated │ [Esc] Done".to_string()
        }
        InputMode::Normal if app.state.is_busy() => {
            "Picking... │ [x] Clear highlight │ [t] Theme │ [Ctrl+C] Exit".to_string()
        }
        InputMode::Normal => "[Space] Pick │ [q] Spin questions │ [Tab] Mode │ [e] Names │ [o] Open │ [c] Clear │ [d] Remove │ [x] Unmark │ [t] Theme │ [Esc] Exit".to_string(),
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.muted));

    f.render_widget(paragraph, area);
}
