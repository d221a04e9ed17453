//! Application state and update logic for the chatdock TUI.

use crate::event::{key_to_action, Action};
use crate::screens::chat::message_area;
use crate::ui::widgets::{max_scroll_back, TextInputState};
use chatdock_engine::{Conversation, ConversationController, InFlight, SubmitOutcome};
use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::layout::Rect;
use tracing::debug;

/// Lines moved per PageUp/PageDown.
const SCROLL_STEP: u16 = 5;

/// TUI state wrapped around one conversation.
pub struct App {
    controller: ConversationController,
    /// Draft editor; every edit is mirrored into the conversation draft.
    pub input: TextInputState,
    /// Model name shown in the status bar.
    pub model: Option<String>,
    pub should_quit: bool,
    pub show_help: bool,
    /// Animation counter, advanced on every tick.
    pub tick_count: usize,
    /// Lines scrolled back from the newest message (0 = following).
    pub scroll_back: u16,
    /// Last known terminal area, used to bound scrolling.
    viewport: Rect,
    in_flight: Option<InFlight>,
}

impl App {
    pub fn new(controller: ConversationController) -> Self {
        Self {
            controller,
            input: TextInputState::new(),
            model: None,
            should_quit: false,
            show_help: false,
            tick_count: 0,
            scroll_back: 0,
            viewport: Rect::new(0, 0, 80, 24),
            in_flight: None,
        }
    }

    /// Start with the panel open instead of the launcher.
    #[must_use]
    pub fn with_panel_open(mut self, open: bool) -> Self {
        if open != self.conversation().is_panel_open() {
            self.controller.toggle_panel();
        }
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn conversation(&self) -> &Conversation {
        self.controller.conversation()
    }

    pub fn is_following(&self) -> bool {
        self.scroll_back == 0
    }

    pub fn set_viewport(&mut self, area: Rect) {
        self.viewport = area;
    }

    /// Translate a key press and apply it.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let action = key_to_action(key, self.conversation().is_panel_open());
        self.handle_action(action);
    }

    pub fn handle_action(&mut self, action: Action) {
        // Global actions
        match action {
            Action::Quit => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match action {
            Action::TogglePanel => {
                self.controller.toggle_panel();
            }
            Action::Submit => self.submit(),
            Action::Insert(c) => self.edit(|input| input.insert(c)),
            Action::Backspace => self.edit(TextInputState::backspace),
            Action::Delete => self.edit(TextInputState::delete),
            Action::Left => self.input.move_left(),
            Action::Right => self.input.move_right(),
            Action::Home => self.input.move_home(),
            Action::End => self.input.move_end(),
            Action::HistoryPrev => {
                if self.input.is_empty() || self.input.is_browsing_history() {
                    self.edit(TextInputState::history_prev);
                }
            }
            Action::HistoryNext => {
                if self.input.is_browsing_history() {
                    self.edit(TextInputState::history_next);
                }
            }
            Action::ScrollUp => self.scroll_up(),
            Action::ScrollDown => self.scroll_down(),
            Action::Quit | Action::Help | Action::None => {}
        }
    }

    fn edit(&mut self, f: impl FnOnce(&mut TextInputState)) {
        f(&mut self.input);
        self.controller.update_draft(self.input.content());
    }

    fn submit(&mut self) {
        // The controller decides admission; the editor only clears if it was admitted.
        if let Ok(in_flight) = self.controller.dispatch() {
            self.input.submit();
            self.in_flight = Some(in_flight);
            self.follow_latest();
        }
    }

    fn scroll_up(&mut self) {
        let conversation = self.controller.conversation();
        let max = max_scroll_back(
            conversation.transcript(),
            conversation.is_pending(),
            message_area(self.viewport),
        );
        self.scroll_back = self.scroll_back.saturating_add(SCROLL_STEP).min(max);
    }

    fn scroll_down(&mut self) {
        self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP);
    }

    fn follow_latest(&mut self) {
        self.scroll_back = 0;
    }

    /// Whether a reply is outstanding.
    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Resolve the outstanding request if it has finished. Never blocks.
    pub async fn poll_reply(&mut self) -> Option<SubmitOutcome> {
        if !self.in_flight.as_ref().is_some_and(InFlight::is_finished) {
            return None;
        }
        self.await_reply().await
    }

    /// Wait for the outstanding request, if any, and append its reply.
    pub async fn await_reply(&mut self) -> Option<SubmitOutcome> {
        let in_flight = self.in_flight.take()?;
        // Only ever holds requests this controller dispatched.
        let outcome = self.controller.complete(in_flight).await.ok()?;
        self.follow_latest();
        Some(outcome)
    }

    /// Abort any outstanding request before exit.
    pub fn shutdown(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(
                conversation = %self.conversation().id(),
                "abandoning in-flight request on exit"
            );
            in_flight.abort();
        }
    }

    /// Advance animations.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }
}
