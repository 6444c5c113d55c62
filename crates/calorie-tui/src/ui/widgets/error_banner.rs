//! Dismissible error banner shown above the input bar.

use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const DISMISS_HINT: &str = "[Esc] dismiss ";

/// One-line error strip: `Error: <message>` with a dismiss hint on the right.
pub struct ErrorBanner<'a> {
    message: &'a str,
}

impl<'a> ErrorBanner<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Widget for ErrorBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let hint_width = DISMISS_HINT.len() as u16;
        let show_hint = area.width > hint_width * 3;
        let text_width = if show_hint {
            area.width - hint_width - 1
        } else {
            area.width
        };

        let text = truncate_to_width(&format!(" Error: {}", self.message), usize::from(text_width));
        Paragraph::new(Line::from(vec![Span::styled(text, Styles::banner())]))
            .style(Styles::banner())
            .render(area, buf);

        if show_hint {
            let x = area.x + area.width - hint_width;
            buf.set_string(x, area.y, DISMISS_HINT, Styles::banner());
        }
    }
}

/// Cut `text` to `max` display columns, ending in an ellipsis when shortened.
fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
