//! Transcript view with wrapping, alignment and a typing indicator.

use crate::ui::theme::{typing_frame, Styles};
use chatdock_engine::{Message, Transcript};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Greeting shown while the transcript is empty.
pub const GREETING_TITLE: &str = "Hello! I'm your AI Assistant";
pub const GREETING_BODY: &str = "How can I help you today?";

/// Renders a transcript bottom-up, scrolled back by `scroll_back` lines.
#[derive(Debug, Clone)]
pub struct MessageList<'a> {
    transcript: &'a Transcript,
    pending: bool,
    tick: usize,
    scroll_back: u16,
}

impl<'a> MessageList<'a> {
    pub fn new(transcript: &'a Transcript) -> Self {
        Self {
            transcript,
            pending: false,
            tick: 0,
            scroll_back: 0,
        }
    }

    /// Show the typing indicator, animated by `tick`.
    #[must_use]
    pub fn pending(mut self, pending: bool, tick: usize) -> Self {
        self.pending = pending;
        self.tick = tick;
        self
    }

    /// Lines to scroll back from the newest message.
    #[must_use]
    pub fn scroll_back(mut self, lines: u16) -> Self {
        self.scroll_back = lines;
        self
    }

    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let bubble = bubble_width(width);
        let mut lines = Vec::new();

        for (i, message) in self.transcript.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            push_message(&mut lines, message, bubble);
        }

        if self.pending {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(typing_frame(self.tick), Styles::active())));
        }

        lines
    }
}

/// Messages wrap at 80% of the list width.
fn bubble_width(width: u16) -> usize {
    (usize::from(width) * 4 / 5).max(1)
}

fn push_message(lines: &mut Vec<Line<'static>>, message: &Message, bubble: usize) {
    let (style, alignment) = if message.is_user() {
        (Styles::user_message(), Alignment::Right)
    } else {
        (Styles::bot_message(), Alignment::Left)
    };

    for row in textwrap::wrap(message.text(), bubble) {
        lines.push(Line::from(Span::styled(row.into_owned(), style)).alignment(alignment));
    }
    lines.push(
        Line::from(Span::styled(message.timestamp().to_string(), Styles::dim()))
            .alignment(alignment),
    );
}

fn greeting() -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::from(Span::styled(
            GREETING_TITLE,
            Styles::title().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(Span::styled(GREETING_BODY, Styles::dim())).alignment(Alignment::Center),
    ]
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        if self.transcript.is_empty() && !self.pending {
            Paragraph::new(greeting()).render(area, buf);
            return;
        }

        let lines = self.lines(area.width);
        let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let overflow = total.saturating_sub(area.height);
        let top = overflow - self.scroll_back.min(overflow);

        Paragraph::new(lines).scroll((top, 0)).render(area, buf);
    }
}

/// Greatest useful `scroll_back` for a transcript rendered into `area`.
pub fn max_scroll_back(transcript: &Transcript, pending: bool, area: Rect) -> u16 {
    let lines = MessageList::new(transcript)
        .pending(pending, 0)
        .lines(area.width)
        .len();
    u16::try_from(lines)
        .unwrap_or(u16::MAX)
        .saturating_sub(area.height)
}
