//! Single-line draft input with history recall.

use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::collections::VecDeque;
use unicode_width::UnicodeWidthChar;

/// Prompt shown before the draft.
pub const PROMPT: &str = "> ";

/// Placeholder shown while the draft is empty.
pub const PLACEHOLDER: &str = "Ask me anything...";

/// Most sent drafts kept for recall; older ones are dropped first.
pub const HISTORY_LIMIT: usize = 100;

/// Rendering of a [`TextInputState`].
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    content: &'a str,
    cursor: usize,
    placeholder: Option<&'a str>,
    style: Style,
}

impl<'a> TextInput<'a> {
    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Set the base style.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        let mut spans = vec![Span::styled(PROMPT, Styles::active())];

        if self.content.is_empty() {
            spans.push(Span::styled("_", Styles::active()));
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
            Paragraph::new(Line::from(spans))
                .style(self.style)
                .render(area, buf);
            return;
        }

        let available = usize::from(area.width).saturating_sub(PROMPT.len());
        let (before, after) = visible_window(self.content, self.cursor, available);

        spans.push(Span::raw(before));
        let marker = if after.is_empty() { "_" } else { "|" };
        spans.push(Span::styled(marker, Styles::active()));
        spans.push(Span::raw(after));

        Paragraph::new(Line::from(spans))
            .style(self.style)
            .render(area, buf);
    }
}

/// Slice the draft so the cursor stays visible within `width` columns.
///
/// Returns the text left of the cursor and the text right of it. One column
/// is reserved for the cursor marker.
fn visible_window(content: &str, cursor: usize, width: usize) -> (String, String) {
    let budget = width.saturating_sub(1);
    let chars: Vec<char> = content.chars().collect();
    let cursor = cursor.min(chars.len());

    let mut used = 0;
    let mut start = cursor;
    while start > 0 {
        let w = chars[start - 1].width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        start -= 1;
    }

    let mut end = cursor;
    while end < chars.len() {
        let w = chars[end].width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end += 1;
    }

    (
        chars[start..cursor].iter().collect(),
        chars[cursor..end].iter().collect(),
    )
}

/// Draft text, cursor, and previously sent entries.
///
/// The cursor is a character index, so editing is safe for any UTF-8 input.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    cursor: usize,
    /// Sent drafts, oldest first, at most [`HISTORY_LIMIT`].
    history: VecDeque<String>,
    /// Position in `history` counted from the newest entry, while browsing.
    history_index: Option<usize>,
    /// Input saved when browsing started.
    saved_input: String,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether Up/Down are currently walking the history.
    pub fn is_browsing_history(&self) -> bool {
        self.history_index.is_some()
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    /// Take the content, clearing the state.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Take the content and remember it for history recall.
    pub fn submit(&mut self) -> String {
        let content = self.take();
        if !content.trim().is_empty() {
            if self.history.len() == HISTORY_LIMIT {
                self.history.pop_front();
            }
            self.history.push_back(content.clone());
        }
        self.history_index = None;
        self.saved_input.clear();
        content
    }

    /// Step to the previous (older) history entry.
    pub fn history_prev(&mut self) {
        let next = match self.history_index {
            None if self.history.is_empty() => return,
            None => {
                self.saved_input = self.content.clone();
                0
            }
            Some(i) if i + 1 < self.history.len() => i + 1,
            Some(_) => return,
        };
        self.history_index = Some(next);
        self.load_history_entry(next);
    }

    /// Step to the next (newer) history entry, restoring the saved input at the end.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.history_index = None;
                self.content = std::mem::take(&mut self.saved_input);
                self.move_end();
            }
            Some(i) => {
                self.history_index = Some(i - 1);
                self.load_history_entry(i - 1);
            }
        }
    }

    fn load_history_entry(&mut self, from_newest: usize) {
        let index = self.history.len() - 1 - from_newest;
        self.content.clone_from(&self.history[index]);
        self.move_end();
    }

    /// Create a widget from this state.
    pub fn widget(&self) -> TextInput<'_> {
        TextInput {
            content: &self.content,
            cursor: self.cursor,
            placeholder: None,
            style: Style::default(),
        }
    }
}
