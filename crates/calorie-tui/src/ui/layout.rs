//! Layout helpers for the calorie TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Height of the header (title + subtitle).
pub const HEADER_HEIGHT: u16 = 2;

/// Height of the bordered input bar.
pub const INPUT_HEIGHT: u16 = 3;

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Areas of the estimator screen, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorLayout {
    pub header: Rect,
    pub conversation: Rect,
    /// Present only while an error banner is showing.
    pub banner: Option<Rect>,
    pub input: Rect,
    pub status: Rect,
}

/// Split the screen into header, conversation, optional banner, input and status bar.
pub fn estimator_layout(area: Rect, banner_visible: bool) -> EstimatorLayout {
    let banner_height = u16::from(banner_visible);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(banner_height),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);

    EstimatorLayout {
        header: chunks[0],
        conversation: chunks[1],
        banner: banner_visible.then_some(chunks[2]),
        input: chunks[3],
        status: chunks[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed() {
        let area = Rect::new(0, 0, 80, 24);
        let centered = centered_fixed(40, 10, area);
        assert_eq!(centered, Rect::new(20, 7, 40, 10));

        // Larger than the parent is clamped.
        let clamped = centered_fixed(100, 30, area);
        assert_eq!(clamped.width, 80);
        assert_eq!(clamped.height, 24);
    }

    #[test]
    fn test_estimator_layout_without_banner() {
        let layout = estimator_layout(Rect::new(0, 0, 80, 24), false);
        assert_eq!(layout.header.height, HEADER_HEIGHT);
        assert_eq!(layout.input.height, INPUT_HEIGHT);
        assert_eq!(layout.status.height, 1);
        assert!(layout.banner.is_none());
        assert_eq!(layout.conversation.height, 24 - HEADER_HEIGHT - INPUT_HEIGHT - 1);
        assert_eq!(layout.status.y, 23);
    }

    #[test]
    fn test_estimator_layout_with_banner() {
        let layout = estimator_layout(Rect::new(0, 0, 80, 24), true);
        let banner = layout.banner.unwrap();
        assert_eq!(banner.height, 1);
        assert_eq!(banner.y + 1, layout.input.y);
        assert_eq!(
            layout.conversation.height,
            24 - HEADER_HEIGHT - INPUT_HEIGHT - 1 - 1
        );
    }
}
