//! The collapsed launcher button.

use crate::ui::theme::{Styles, Symbols};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Button shown in place of the panel while it is closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Launcher;

impl Launcher {
    pub const HEIGHT: u16 = 3;

    /// Label width plus borders and one column of padding on each side.
    #[allow(clippy::cast_possible_truncation)]
    pub fn width() -> u16 {
        Symbols::LAUNCHER.width() as u16 + 4
    }
}

impl Widget for Launcher {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Styles::border_active());

        Paragraph::new(Symbols::LAUNCHER)
            .style(Styles::launcher())
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_width() {
        assert_eq!(Launcher::width(), 20);
    }
}
