//! Screen definitions for the calorie TUI.

pub mod estimator;

use crate::app::App;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    use crate::ui::centered_fixed;
    use crate::ui::theme::Styles;
    use ratatui::widgets::{Block, Borders, Clear, Paragraph};

    let help_text = r"
  Estimating
    Enter             Estimate the draft
    Up/Down           Previous/next query
    Esc               Dismiss error

  Conversation
    PgUp/PgDn         Scroll a page
    Mouse wheel       Scroll
    Ctrl+Home/End     Oldest/latest entry
    Ctrl+L            Clear conversation

    F1                Toggle this help
    Ctrl+C            Quit

  [Press any key to close]
";

    let width = 50.min(area.width.saturating_sub(4));
    let height = 19.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    Paragraph::new(help_text)
        .block(block)
        .style(Styles::default())
        .render(overlay_area, buf);
}
