//! Theme and styling definitions for the chatdock TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(24, 24, 32);
    pub const PANEL_BG: Color = Color::Rgb(32, 32, 44);
    pub const FG: Color = Color::Rgb(225, 225, 235);
    pub const DIM: Color = Color::Rgb(135, 135, 155);

    // Accent colors (the original purple-to-blue gradient, flattened)
    pub const ACCENT: Color = Color::Rgb(150, 120, 255);
    pub const ACCENT_ALT: Color = Color::Rgb(100, 150, 255);

    // Message colors
    pub const USER_FG: Color = Color::Rgb(190, 175, 255);
    pub const BOT_FG: Color = Color::Rgb(225, 225, 235);

    // Status bar colors
    pub const STATUS_BG: Color = Color::Rgb(42, 42, 58);
    pub const STATUS_KEY_BG: Color = Color::Rgb(80, 70, 150);

    // Border colors
    pub const BORDER: Color = Color::Rgb(70, 70, 95);
    pub const BORDER_ACTIVE: Color = Color::Rgb(150, 120, 255);
}

/// Glyphs used across the UI.
pub struct Symbols;

impl Symbols {
    pub const LAUNCHER: &'static str = "◉ AI Assistant ✦";
    pub const CLOSE: &'static str = "[Esc] ✕";
    pub const SEND: &'static str = "[Enter] send ➤";
    pub const TYPING: [&'static str; 4] = ["•", "• •", "• • •", "  • •"];
}

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Panel surface.
    pub fn panel() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::PANEL_BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Active/focused element.
    pub fn active() -> Style {
        Style::default().fg(Palette::ACCENT_ALT)
    }

    pub fn user_message() -> Style {
        Style::default().fg(Palette::USER_FG)
    }

    pub fn bot_message() -> Style {
        Style::default().fg(Palette::BOT_FG)
    }

    /// The launcher button.
    pub fn launcher() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for status bar).
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border style for active/focused elements.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }
}

/// Frame of the typing indicator for the given tick.
pub fn typing_frame(tick: usize) -> &'static str {
    Symbols::TYPING[tick % Symbols::TYPING.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_frame_cycles() {
        assert_eq!(typing_frame(0), "•");
        assert_eq!(typing_frame(2), "• • •");
        assert_eq!(typing_frame(Symbols::TYPING.len()), typing_frame(0));
    }
}
