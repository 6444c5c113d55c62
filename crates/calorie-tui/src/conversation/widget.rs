//! Conversation pane widget.

use calorie_engine::ConversationState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::lines::conversation_lines;
use super::scroll::ScrollState;
use crate::ui::theme::Styles;

/// Bordered pane showing the conversation log.
pub struct ConversationPane<'a> {
    state: &'a ConversationState,
    scroll: &'a ScrollState,
    tick: usize,
}

impl<'a> ConversationPane<'a> {
    pub fn new(state: &'a ConversationState, scroll: &'a ScrollState) -> Self {
        Self {
            state,
            scroll,
            tick: 0,
        }
    }

    /// Animation tick for the pending indicator.
    #[must_use]
    pub fn tick(mut self, tick: usize) -> Self {
        self.tick = tick;
        self
    }

    /// Inner area of the pane (inside the border).
    pub fn inner(area: Rect) -> Rect {
        Self::block(None).inner(area)
    }

    fn block(title: Option<String>) -> Block<'static> {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border());
        match title {
            Some(title) => block.title(title).title_style(Styles::title()),
            None => block,
        }
    }
}

impl Widget for ConversationPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let count = self.state.log().len();
        let title = if count == 0 {
            " Conversation ".to_string()
        } else {
            format!(" Conversation ({count}) ")
        };
        let block = Self::block(Some(title));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = conversation_lines(self.state, self.tick, inner.width);
        let first = self
            .scroll
            .first_visible_line(lines.len(), usize::from(inner.height));
        let first = u16::try_from(first).unwrap_or(u16::MAX);

        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((first, 0))
            .render(inner, buf);

        if !self.scroll.is_following() {
            let marker = " ↓ more ";
            #[allow(clippy::cast_possible_truncation)]
            let marker_width = marker.chars().count() as u16;
            if area.width > marker_width + 2 {
                let x = area.x + area.width - marker_width - 1;
                let y = area.y + area.height.saturating_sub(1);
                buf.set_string(x, y, marker, Styles::dim());
            }
        }
    }
}
