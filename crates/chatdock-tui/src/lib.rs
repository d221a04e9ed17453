//! chatdock-tui: Terminal UI for the chatdock assistant
//!
//! This crate provides the presentation layer over
//! [`chatdock_engine::ConversationController`]:
//! - A launcher button anchored to the top-right corner
//! - A floating chat panel with transcript, typing indicator and input
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod ui;

pub use app::App;
pub use chatdock_engine;
pub use event::{Action, Event, EventHandler};

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, stdout};
use tracing::info;

/// Tick rate for redraws and the typing animation.
const TICK_RATE_MS: u64 = 120;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop until the user quits, and
/// restores the terminal on exit (including on error).
pub async fn run_tui(mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(conversation = %app.conversation().id(), "tui started");

    let mut events = EventHandler::new(TICK_RATE_MS);
    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    app.shutdown();

    terminal.show_cursor()?;
    info!(
        conversation = %app.conversation().id(),
        messages = app.conversation().transcript().len(),
        "tui stopped"
    );

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let size = terminal.size()?;
        app.set_viewport(Rect::new(0, 0, size.width, size.height));

        terminal.draw(|frame| {
            let area = frame.area();
            screens::render_app(app, area, frame.buffer_mut());
        })?;

        if app.should_quit {
            break;
        }

        app.poll_reply().await;

        match events.next().await {
            Some(Event::Key(key)) => app.handle_key(key),
            Some(Event::Mouse(mouse)) => match mouse.kind {
                MouseEventKind::ScrollUp => app.handle_action(Action::ScrollUp),
                MouseEventKind::ScrollDown => app.handle_action(Action::ScrollDown),
                _ => {}
            },
            Some(Event::Tick) => app.tick(),
            // Redrawn on the next pass
            Some(Event::Resize(_, _)) => {}
            None => break,
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}

#[cfg(test)]
mod snapshot_tests {
    use crate::test_utils::render_widget_to_string;
    use crate::ui::widgets::Launcher;
    use insta::assert_snapshot;

    #[test]
    fn test_snapshot_launcher() {
        let result = render_widget_to_string(Launcher, Launcher::width(), Launcher::HEIGHT);
        assert_snapshot!(result, @r"
        ╭──────────────────╮
        │ ◉ AI Assistant ✦ │
        ╰──────────────────╯
        ");
    }
}

/// Event-handling tests that drive [`App`] through actions.
#[cfg(test)]
mod navigation_tests {
    use crate::event::Action;
    use crate::test_utils::{create_open_test_app, create_test_app, ScriptedService};

    #[test]
    fn test_launcher_opens_panel() {
        let mut app = create_test_app();
        assert!(!app.conversation().is_panel_open());

        app.handle_action(Action::TogglePanel);
        assert!(app.conversation().is_panel_open());
    }

    #[test]
    fn test_close_panel_keeps_transcript_and_draft() {
        let mut app = create_open_test_app(ScriptedService::replying(&[]));
        app.handle_action(Action::Insert('h'));
        app.handle_action(Action::TogglePanel);

        assert!(!app.conversation().is_panel_open());
        assert_eq!(app.conversation().draft(), "h");
        assert_eq!(app.input.content(), "h");
    }

    #[test]
    fn test_help_overlay_toggle() {
        let mut app = create_test_app();
        assert!(!app.show_help);

        app.handle_action(Action::Help);
        assert!(app.show_help);

        // Any key closes help without acting on it
        app.handle_action(Action::TogglePanel);
        assert!(!app.show_help);
        assert!(!app.conversation().is_panel_open());
    }

    #[test]
    fn test_help_closes_before_quit() {
        let mut app = create_test_app();
        app.show_help = true;

        app.handle_action(Action::Quit);
        assert!(!app.show_help);
        assert!(!app.should_quit);

        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_action_none_does_nothing() {
        let mut app = create_test_app();
        app.handle_action(Action::None);
        assert!(!app.should_quit);
        assert!(!app.conversation().is_panel_open());
    }

    #[test]
    fn test_history_keys_ignored_while_editing() {
        let mut app = create_open_test_app(ScriptedService::replying(&[]));
        app.handle_action(Action::Insert('x'));
        app.handle_action(Action::HistoryPrev);
        app.handle_action(Action::HistoryNext);
        assert_eq!(app.input.content(), "x");
    }
}
