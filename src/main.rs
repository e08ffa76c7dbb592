use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;  // Use tokio Mutex for async compatibility

use random_picker::app::App;
use random_picker::events::{EventHandler, AppEvent};
use random_picker::ui;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Optional question file to load at startup
    let questions = std::env::args_os().nth(1).map(PathBuf::from);

    // Setup terminal with proper error handling
    if let Err(e) = setup_terminal(questions).await {
        eprintln!("Failed to setup terminal: {}", e);
        return Err(e);
    }

    Ok(())
}

async fn setup_terminal(questions: Option<PathBuf>) -> Result<()> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Force clear to trigger initial full render
    terminal.clear()?;

    // Create app
    let app = match App::new(questions).await {
        Ok(app) => app,
        Err(e) => {
            // Cleanup terminal before returning error
            cleanup_terminal(&mut terminal)?;
            return Err(e);
        }
    };

    let frame_interval_ms = app.state.config.read().frame_interval_ms();

    let app_state = Arc::new(Mutex::new(app));

    let event_handler = EventHandler::new(frame_interval_ms);

    // Run the application
    let res = run_app(&mut terminal, app_state, event_handler).await;

    // Always cleanup terminal
    cleanup_terminal(&mut terminal)?;

    res
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app_state: Arc<Mutex<App>>,
    mut event_handler: EventHandler,
) -> Result<()> {
    // Force initial draw
    {
        let app = app_state.lock().await;
        terminal.draw(|f| {
            ui::render(f, &app, Instant::now());
        })?;
        io::stdout().flush()?;
    }

    let mut needs_clear = false;

    loop {
        let event = event_handler.next().await;

        // Check if we need to force clear (after resize)
        if needs_clear {
            terminal.clear()?;
            needs_clear = false;
        }

        let should_continue = match event {
            AppEvent::Input(crossterm_event) => {
                if matches!(crossterm_event, CrosstermEvent::Resize(_, _)) {
                    needs_clear = true;
                }

                let mut app = app_state.lock().await;
                app.handle_event(crossterm_event)?
            }
            AppEvent::Frame => {
                let mut app = app_state.lock().await;
                app.tick(Instant::now());
                true
            }
        };

        if !should_continue {
            break;
        }

        // Render after each event
        {
            let app = app_state.lock().await;
            terminal.draw(|f| {
                ui::render(f, &app, Instant::now());
            })?;

            io::stdout().flush()?;
        }
    }

    Ok(())
}
