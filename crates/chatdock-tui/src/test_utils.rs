//! Test utilities for chatdock-tui rendering and event tests.
//!
//! Provides scripted generation services, app builders, and helpers that
//! render screens into plain strings.

use crate::app::App;
pub use crate::headless::buffer_to_string;
use crate::screens::Screen as ScreenTrait;
use async_trait::async_trait;
use chatdock_engine::{ConversationController, GenerationError, GenerationService};
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, widgets::Widget, Terminal};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Generation service that replays canned results in order.
///
/// When gated, each request waits for a `notify_one` on the gate before
/// answering. Once the script runs out every request fails.
#[derive(Default)]
pub struct ScriptedService {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedService {
    pub fn new(replies: Vec<Result<String, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        })
    }

    /// Succeed with each of `replies` in turn.
    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Ok((*r).to_string())).collect())
    }

    /// Like [`ScriptedService::replying`], but every answer waits for the gate.
    pub fn gated(replies: &[&str]) -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| Ok((*r).to_string())).collect()),
            calls: AtomicUsize::new(0),
            gate: Some(Arc::clone(&gate)),
        });
        (service, gate)
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

/// Create a test terminal with the default dimensions (80x24).
pub fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(TEST_WIDTH, TEST_HEIGHT);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a test app with the panel closed and a service with no replies.
pub fn create_test_app() -> App {
    App::new(ConversationController::new(ScriptedService::replying(&[])))
}

/// Create a test app with the panel open, backed by `service`.
pub fn create_open_test_app(service: Arc<ScriptedService>) -> App {
    App::new(ConversationController::new(service)).with_panel_open(true)
}

/// Render a screen into a fresh buffer of the given size.
pub fn render_screen_to_buffer<S: ScreenTrait>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> Buffer {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer
}

/// Render a screen at the default size and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render a screen with custom dimensions and return it as a string.
pub fn render_screen_to_string_sized<S: ScreenTrait>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> String {
    buffer_to_string(&render_screen_to_buffer(screen, app, width, height))
}

/// Render a single widget into a buffer of the given size.
pub fn render_widget_to_string<W: Widget>(widget: W, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    widget.render(area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_create_test_apps() {
        assert!(!create_test_app().conversation().is_panel_open());
        let open = create_open_test_app(ScriptedService::replying(&[]));
        assert!(open.conversation().is_panel_open());
    }

    #[tokio::test]
    async fn test_scripted_service_replays_then_fails() {
        let service = ScriptedService::replying(&["one"]);
        assert_eq!(service.generate("a").await.unwrap(), "one");
        assert!(service.generate("b").await.is_err());
        assert_eq!(service.calls(), 2);
    }
}
