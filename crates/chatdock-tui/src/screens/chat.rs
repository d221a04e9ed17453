//! The single chat screen: launcher or panel, plus the status bar.

use super::Screen;
use crate::app::App;
use crate::ui::layout::{anchored_top_right, main_layout};
use crate::ui::theme::{Styles, Symbols};
use crate::ui::widgets::text_input::PLACEHOLDER;
use crate::ui::widgets::{KeyHint, Launcher, MessageList, StatusBar};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

pub const PANEL_MAX_WIDTH: u16 = 48;
pub const PANEL_MAX_HEIGHT: u16 = 30;
const MARGIN: u16 = 1;

const TITLE: &str = "AI Assistant";
const SUBTITLE: &str = "Powered by Gemini";

const LAUNCHER_HINTS: [KeyHint; 3] = [
    KeyHint::new("Enter", "open"),
    KeyHint::new("?", "help"),
    KeyHint::new("q", "quit"),
];

const PANEL_HINTS: [KeyHint; 3] = [
    KeyHint::new("Enter", "send"),
    KeyHint::new("PgUp/PgDn", "scroll"),
    KeyHint::new("Esc", "close"),
];

struct PanelAreas {
    panel: Rect,
    header: Rect,
    messages: Rect,
    input: Rect,
}

fn panel_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Styles::border_active())
        .style(Styles::panel())
}

fn panel_areas(area: Rect) -> PanelAreas {
    let (body, _) = main_layout(area);
    let panel = anchored_top_right(PANEL_MAX_WIDTH, PANEL_MAX_HEIGHT, body, MARGIN);
    let inner = panel_block().inner(panel);
    let [header, messages, input] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .areas(inner);

    PanelAreas {
        panel,
        header,
        messages: messages.inner(Margin::new(1, 0)),
        input,
    }
}

/// Where the message list lands for a terminal of size `area`.
pub fn message_area(area: Rect) -> Rect {
    panel_areas(area).messages
}

/// The chat screen.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let (body, status_area) = main_layout(area);
        Block::default().style(Styles::default()).render(body, buf);

        let conversation = app.conversation();
        if conversation.is_panel_open() {
            render_panel(app, area, buf);
        } else {
            let launcher = anchored_top_right(Launcher::width(), Launcher::HEIGHT, body, MARGIN);
            Launcher.render(launcher, buf);
        }

        let (mode, hints): (&str, &[KeyHint]) = if conversation.is_pending() {
            ("WAITING", &PANEL_HINTS)
        } else if conversation.is_panel_open() {
            ("CHAT", &PANEL_HINTS)
        } else {
            ("READY", &LAUNCHER_HINTS)
        };
        let mut status = StatusBar::new(mode).hints(hints);
        if let Some(model) = app.model.as_deref() {
            status = status.right(model);
        }
        status.render(status_area, buf);
    }
}

fn render_panel(app: &App, area: Rect, buf: &mut Buffer) {
    let areas = panel_areas(area);
    let conversation = app.conversation();

    Clear.render(areas.panel, buf);
    panel_block().render(areas.panel, buf);

    // Header
    let header_block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Styles::border());
    let header = header_block.inner(areas.header);
    header_block.render(areas.header, buf);

    let gap = usize::from(header.width).saturating_sub(TITLE.width() + Symbols::CLOSE.width());
    Paragraph::new(vec![
        Line::from(vec![
            Span::styled(TITLE, Styles::title()),
            Span::raw(" ".repeat(gap)),
            Span::styled(Symbols::CLOSE, Styles::dim()),
        ]),
        Line::from(Span::styled(SUBTITLE, Styles::dim())),
    ])
    .render(header, buf);

    // Messages
    MessageList::new(conversation.transcript())
        .pending(conversation.is_pending(), app.tick_count)
        .scroll_back(app.scroll_back)
        .render(areas.messages, buf);

    // Input
    let input_block = Block::default()
        .borders(Borders::TOP)
        .border_style(Styles::border());
    let input = input_block.inner(areas.input);
    input_block.render(areas.input, buf);

    let [input_row, hint_row] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(input);
    app.input
        .widget()
        .placeholder(PLACEHOLDER)
        .style(Styles::panel())
        .render(input_row, buf);

    let can_send = !conversation.is_pending() && !conversation.draft().trim().is_empty();
    let hint_style = if can_send {
        Styles::active()
    } else {
        Styles::dim()
    };
    Paragraph::new(Line::from(Span::styled(Symbols::SEND, hint_style)))
        .alignment(Alignment::Right)
        .render(hint_row, buf);
}
