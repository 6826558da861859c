//! # Terminal User Interface
//!
//! Ratatui front end for the client. Each frame draws the active screen,
//! advances the application by one tick and then waits up to one frame
//! period for input. Mouse presses are scaled from terminal cells into the
//! virtual screen, so the board is hit-tested with the same geometry it is
//! laid out with.

use crate::app::App;
use crate::error::AppError;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};
use tracing::info;

pub mod input;
pub mod render;
pub mod viewport;

use viewport::Viewport;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Runs the client until the user quits. The terminal is restored even when
/// the loop fails.
pub fn run(app: &mut App) -> Result<(), AppError> {
    let mut terminal = init_terminal()?;
    let result = event_loop(&mut terminal, app);
    restore_terminal(&mut terminal)?;
    result
}

fn event_loop(terminal: &mut Term, app: &mut App) -> Result<(), AppError> {
    let frame = Duration::from_secs_f64(1.0 / f64::from(app.config().system.fps.max(1)));
    info!(fps = app.config().system.fps, "ui loop started");

    while !app.should_quit() {
        terminal.draw(|f| render::draw(app, f))?;
        app.tick();

        if event::poll(frame)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key)?,
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let viewport = Viewport::new(size.width, size.height, &app.config().system);
                    input::handle_mouse(app, mouse, &viewport)?;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn init_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, crossterm::cursor::Hide)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        crossterm::cursor::Show
    )?;
    Ok(())
}
