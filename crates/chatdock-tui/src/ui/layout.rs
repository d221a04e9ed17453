//! Layout helpers for the chatdock TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Create a rect of at most `width`×`height` pinned to the top-right corner
/// of `area`, inset by `margin` cells (two columns per margin cell).
pub fn anchored_top_right(width: u16, height: u16, area: Rect, margin: u16) -> Rect {
    let inset_x = margin.saturating_mul(2).min(area.width);
    let inset_y = margin.min(area.height);
    let avail_w = area.width - inset_x;
    let avail_h = area.height - inset_y;

    let w = width.min(avail_w);
    let h = height.min(avail_h);
    let x = area.x + avail_w - w;
    let y = area.y + inset_y;
    Rect::new(x, y, w, h)
}

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Create the main layout with status bar at bottom.
pub fn main_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_top_right_fits() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = anchored_top_right(20, 3, area, 1);
        assert_eq!(rect, Rect::new(58, 1, 20, 3));
    }

    #[test]
    fn test_anchored_top_right_clamps_to_area() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = anchored_top_right(48, 30, area, 1);
        assert_eq!(rect, Rect::new(0, 1, 28, 9));
    }

    #[test]
    fn test_anchored_top_right_tiny_area() {
        let area = Rect::new(0, 0, 1, 1);
        let rect = anchored_top_right(48, 30, area, 1);
        assert_eq!(rect.width, 0);
        assert_eq!(rect.height, 0);
    }

    #[test]
    fn test_centered_fixed() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered_fixed(40, 10, area), Rect::new(20, 7, 40, 10));
    }

    #[test]
    fn test_main_layout_reserves_status_line() {
        let (body, status) = main_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(body.height, 23);
        assert_eq!(status, Rect::new(0, 23, 80, 1));
    }
}
