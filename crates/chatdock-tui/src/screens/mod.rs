//! Screen definitions for the chatdock TUI.

pub mod chat;

use crate::app::App;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render everything visible for `app`: the chat screen plus overlays.
pub fn render_app(app: &App, area: Rect, buf: &mut Buffer) {
    chat::ChatScreen.render(app, area, buf);
    if app.show_help {
        render_help_overlay(area, buf);
    }
}

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    use crate::ui::centered_fixed;
    use crate::ui::theme::Styles;
    use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

    let help_text = r"
  Launcher
    Enter / Space / o   Open the assistant
    q / Esc             Quit
    ?                   Toggle this help

  Panel
    Enter               Send message
    Up / Down           Recall sent messages
    PgUp / PgDn         Scroll the conversation
    Esc / Ctrl+O        Close the panel
    Ctrl+C              Quit

  [Press any key to close]
";

    let width = 52.min(area.width.saturating_sub(4));
    let height = 18.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Styles::border_active())
        .style(Styles::panel());

    Paragraph::new(help_text)
        .block(block)
        .style(Styles::panel())
        .render(overlay_area, buf);
}
