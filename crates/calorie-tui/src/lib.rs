//! calorie-tui: Terminal UI for the calorie estimation client
//!
//! This crate provides the interactive front end:
//! - A single estimator screen with a scrolling conversation
//! - Draft input with history and an error banner
//! - The run loop that sends requests off the UI thread

mod app;
mod conversation;
mod event;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod ui;

use screens::Screen as ScreenTrait;

pub use app::{App, PendingRequest};
pub use calorie_engine;
pub use event::{Action, Event, EventHandler};

use calorie_engine::{Config, Estimate, EstimateError, EstimationClient, Ticket};
use chrono::Utc;
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io::{self, stdout};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// The request currently on the wire.
struct InFlight {
    ticket: Ticket,
    handle: JoinHandle<Result<Estimate, EstimateError>>,
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop, and restores the terminal on
/// exit.
pub async fn run_tui(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = EstimationClient::new(config)?;

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client.endpoint());
    let mut events = EventHandler::new(config.tick_rate_ms);

    info!(endpoint = client.endpoint(), "Starting TUI");
    let result = run_loop(&mut terminal, &mut app, &mut events, &client).await;

    terminal.show_cursor()?;

    result
}

/// Draw one frame.
fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();
    app.sync_viewport(area);
    screens::estimator::EstimatorScreen.render(app, area, frame.buffer_mut());
}

fn spawn_estimate(client: &EstimationClient, pending: PendingRequest) -> InFlight {
    debug!(ticket = pending.ticket.id(), food_item = %pending.request.food_item, "Dispatching");
    let client = client.clone();
    let handle = tokio::spawn(async move { client.estimate(&pending.request).await });
    InFlight {
        ticket: pending.ticket,
        handle,
    }
}

/// Feed a finished request back into the app (non-blocking).
///
/// Leaves `in_flight` untouched while the task is still running.
async fn poll_in_flight(app: &mut App, in_flight: &mut Option<InFlight>) {
    if !in_flight.as_ref().is_some_and(|f| f.handle.is_finished()) {
        return;
    }
    if let Some(InFlight { ticket, handle }) = in_flight.take() {
        match handle.await {
            Ok(result) => app.complete(ticket, result, Utc::now()),
            Err(e) => {
                debug!(error = %e, "Estimate task failed to join");
                app.abandon(ticket);
            }
        }
    }
}

/// Abort the request on the wire, if any.
fn abort_in_flight(in_flight: &mut Option<InFlight>) {
    if let Some(InFlight { ticket, handle }) = in_flight.take() {
        debug!(ticket = ticket.id(), "Aborting estimate request");
        handle.abort();
    }
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    client: &EstimationClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut in_flight: Option<InFlight> = None;

    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if let Some(event) = events.next().await {
            let dispatch = match event {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                    None
                }
                Event::Tick => {
                    app.tick();
                    None
                }
                // Next draw picks up the new size
                Event::Resize(_, _) => None,
            };
            if let Some(pending) = dispatch {
                in_flight = Some(spawn_estimate(client, pending));
            }
        }

        poll_in_flight(app, &mut in_flight).await;

        if app.should_quit {
            abort_in_flight(&mut in_flight);
            break;
        }
    }

    info!("Exiting TUI");
    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
