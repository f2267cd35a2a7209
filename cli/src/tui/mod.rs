pub mod app;
pub mod theme;
pub mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use dayplan_core::auth::AuthProvider;
use dayplan_core::ScheduleRequester;

use crate::config::AppConfig;
use crate::tui::app::App;
use crate::tui::theme::Theme;

/// Runs the terminal UI until the user quits. Must be called from within a
/// tokio runtime context.
pub fn run(
    config: &AppConfig,
    requester: ScheduleRequester,
    auth: Arc<dyn AuthProvider>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(auth, requester, Theme::get(config.theme));
    let res = run_app(&mut terminal, &mut app, config.tick);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = %err, "terminal UI stopped with an error");
    }
    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, tick: Duration) -> Result<()> {
    loop {
        app.on_tick();
        if app.take_dirty() {
            terminal
                .draw(|f| ui::draw(f, app))
                .map_err(|e| io::Error::other(e.to_string()))?;
        }

        if event::poll(tick)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Resize(_, _) => {
                    terminal
                        .draw(|f| ui::draw(f, app))
                        .map_err(|e| io::Error::other(e.to_string()))?;
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
