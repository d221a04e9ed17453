//! Headless mode for the chatdock TUI.
//!
//! Runs the same event loop against a `TestBackend` instead of a real
//! terminal. Key presses are sent through a channel and the rendered screen
//! is published after every frame, which makes end-to-end tests and
//! scripted demos possible without a TTY.

use crate::app::App;
use crate::screens;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    pub panel_open: bool,
    pub pending: bool,
    /// Number of messages in the transcript.
    pub messages: usize,
    pub should_quit: bool,
    pub show_help: bool,
}

/// Handle to control a headless TUI instance.
pub struct HeadlessHandle {
    key_tx: mpsc::UnboundedSender<KeyEvent>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send a key press. Returns `false` once the TUI has stopped.
    pub fn send_key(&self, key: KeyEvent) -> bool {
        self.key_tx.send(key).is_ok()
    }

    /// Send an unmodified key press.
    pub fn press(&self, code: KeyCode) -> bool {
        self.send_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Send one key press per character.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.press(KeyCode::Char(c)))
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(&mut self, condition: F, timeout: Duration) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the TUI task is gone
                Ok(Err(_)) | Err(_) => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(&mut self, text: &str, timeout: Duration) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub width: u16,
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 20,
        }
    }
}

/// Run the TUI in headless mode on the current tokio runtime.
///
/// # Example
///
/// ```ignore
/// let (mut handle, task) = run_tui_headless(app, HeadlessConfig::default());
///
/// handle.press(KeyCode::Enter); // open the panel
/// handle.type_text("Hello");
/// handle.press(KeyCode::Enter); // send
///
/// let state = handle.wait_for_text("Hi there!", Duration::from_secs(1)).await;
///
/// handle.send_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    app: App,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (key_tx, key_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(app, config, key_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    (HeadlessHandle { key_tx, state_rx }, task)
}

async fn run_headless_loop(
    mut app: App,
    config: HeadlessConfig,
    mut key_rx: mpsc::UnboundedReceiver<KeyEvent>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;
    let tick = Duration::from_millis(config.tick_rate_ms);

    app.set_viewport(Rect::new(0, 0, config.width, config.height));

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::render_app(&app, area, frame.buffer_mut());
        })?;

        let conversation = app.conversation();
        let _ = state_tx.send(HeadlessState {
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            panel_open: conversation.is_panel_open(),
            pending: conversation.is_pending(),
            messages: conversation.transcript().len(),
            should_quit: app.should_quit,
            show_help: app.show_help,
        });

        if app.should_quit {
            break;
        }

        app.poll_reply().await;

        tokio::select! {
            key = key_rx.recv() => match key {
                Some(key) => app.handle_key(key),
                // Handle dropped
                None => break,
            },
            () = tokio::time::sleep(tick) => app.tick(),
        }
    }

    app.shutdown();
    Ok(())
}

/// Convert a terminal buffer to text, one row per line, trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut rows = Vec::with_capacity(usize::from(area.height));

    for y in area.y..area.y + area.height {
        let mut row = String::new();
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                row.push_str(cell.symbol());
            }
        }
        rows.push(row.trim_end().to_string());
    }

    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, ScriptedService};
    use chatdock_engine::{ConversationController, GenerationError, FALLBACK_REPLY};

    const WAIT: Duration = Duration::from_secs(5);

    fn ctrl_c() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_headless_config_default() {
        let config = HeadlessConfig::default();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn test_buffer_to_string() {
        use ratatui::style::Style;

        let area = Rect::new(0, 0, 10, 2);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello   ", Style::default());
        buffer.set_string(0, 1, "World", Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld");
    }

    #[tokio::test]
    async fn test_open_type_send_and_reply() {
        let app = App::new(ConversationController::new(ScriptedService::replying(&[
            "Hi there!",
        ])));
        let (mut handle, task) = run_tui_headless(app, HeadlessConfig::default());

        handle.wait_for_text("◉ AI Assistant ✦", WAIT).await.unwrap();

        handle.press(KeyCode::Enter);
        handle
            .wait_for(|s| s.panel_open, WAIT)
            .await
            .expect("panel should open");

        handle.type_text("Hello");
        handle.press(KeyCode::Enter);

        let state = handle
            .wait_for_text("Hi there!", WAIT)
            .await
            .expect("reply should render");
        assert_eq!(state.messages, 2);
        assert!(!state.pending);
        assert!(state.screen_contents.contains("Hello"));

        handle.send_key(ctrl_c());
        handle.wait_for(|s| s.should_quit, WAIT).await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failure_renders_fallback() {
        let service = ScriptedService::new(vec![Err(GenerationError::Status {
            status: 500,
            message: "boom".into(),
        })]);
        let app = App::new(ConversationController::new(service)).with_panel_open(true);
        let (mut handle, task) = run_tui_headless(app, HeadlessConfig::default());

        handle.type_text("Hello");
        handle.press(KeyCode::Enter);

        // The fallback wraps inside the panel, so match its first words.
        let state = handle
            .wait_for(|s| s.messages == 2 && !s.pending, WAIT)
            .await
            .unwrap();
        let first_words: String = FALLBACK_REPLY.split(' ').take(3).collect::<Vec<_>>().join(" ");
        assert!(state.screen_contents.contains(&first_words));
        assert!(!state.screen_contents.contains("boom"));

        drop(handle);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_help_and_quit_from_launcher() {
        let (mut handle, task) = run_tui_headless(create_test_app(), HeadlessConfig::default());

        handle.press(KeyCode::Char('?'));
        handle.wait_for(|s| s.show_help, WAIT).await.unwrap();
        handle.wait_for_text("Toggle this help", WAIT).await.unwrap();

        // Esc closes help first, then quits.
        handle.press(KeyCode::Esc);
        handle.wait_for(|s| !s.show_help, WAIT).await.unwrap();
        assert!(!handle.has_quit());

        handle.press(KeyCode::Char('q'));
        handle.wait_for(|s| s.should_quit, WAIT).await.unwrap();
        task.await.unwrap().unwrap();
    }
}
