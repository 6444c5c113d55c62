//! Screen header: title and one-line description.

use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

pub const TITLE: &str = "Calorie Information";
pub const SUBTITLE: &str = "Enter a meal or ingredient to get AI-estimated calorie breakdown";

/// Two-line header at the top of the estimator screen.
#[derive(Debug, Default)]
pub struct Header;

impl Widget for Header {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(format!(" {TITLE}"), Styles::title())),
            Line::from(Span::styled(format!(" {SUBTITLE}"), Styles::dim())),
        ];
        Paragraph::new(lines)
            .style(Styles::default())
            .render(area, buf);
    }
}
