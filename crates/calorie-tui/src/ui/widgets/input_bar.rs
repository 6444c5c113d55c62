//! Full-width input bar widget.
//!
//! Always visible at the bottom of the screen for entering a food item.
//! Disabled (shows a waiting indicator) while a request is in flight.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::{spinner_frame, Styles};
use crate::ui::widgets::TextInputState;
use unicode_width::UnicodeWidthStr;

/// Placeholder shown while the draft is empty.
pub const INPUT_PLACEHOLDER: &str = "e.g, chicken breast, apple, pasta with tomato sauce";

const PROMPT: &str = "> ";

/// Full-width input bar for the draft.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    focused: bool,
    loading: bool,
    tick: usize,
    pending_query: Option<&'a str>,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a TextInputState) -> Self {
        Self {
            input,
            focused: true,
            loading: false,
            tick: 0,
            pending_query: None,
        }
    }

    /// Set whether the input bar is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set loading state; `tick` drives the spinner.
    #[must_use]
    pub fn loading(mut self, loading: bool, tick: usize) -> Self {
        self.loading = loading;
        self.tick = tick;
        self
    }

    /// Query being estimated, shown while loading.
    #[must_use]
    pub fn pending_query(mut self, query: Option<&'a str>) -> Self {
        self.pending_query = query;
        self
    }

    /// Build the single input line with the cursor block inserted.
    ///
    /// Returns the line and the display column of the cursor.
    fn build_input_line(&self) -> (Line<'static>, usize) {
        let prompt = Span::styled(PROMPT, Styles::active());

        if self.input.is_empty() {
            let mut spans = vec![prompt];
            if self.focused {
                spans.push(Span::styled("█", Styles::default()));
            }
            spans.push(Span::styled(INPUT_PLACEHOLDER, Styles::dim()));
            return (Line::from(spans), PROMPT.len());
        }

        let chars: Vec<char> = self.input.content().chars().collect();
        let cursor = self.input.cursor.min(chars.len());
        let before: String = chars[..cursor].iter().collect();
        let after: String = chars[cursor..].iter().collect();

        let before_width = before.width();

        let mut spans = vec![prompt, Span::styled(before, Styles::default())];
        if self.focused {
            spans.push(Span::styled("█", Styles::default()));
        }
        spans.push(Span::styled(after, Styles::default()));

        (Line::from(spans), PROMPT.len() + before_width)
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused && !self.loading {
            Styles::border_active()
        } else {
            Styles::border()
        };

        let title = if self.loading {
            " Estimating... "
        } else {
            " Estimate Calories "
        };

        let block = Block::default()
            .title(title)
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(border_style);

        let paragraph = if self.loading {
            let display = match self.pending_query {
                Some(query) => format!("{} Estimating... {query}", spinner_frame(self.tick)),
                None => format!("{} Estimating...", spinner_frame(self.tick)),
            };
            Paragraph::new(display).block(block).style(Styles::dim())
        } else {
            let (line, cursor_col) = self.build_input_line();

            // Scroll horizontally so the cursor stays visible
            let inner_width = usize::from(area.width.saturating_sub(2));
            let scroll = (cursor_col + 1).saturating_sub(inner_width);
            let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);

            Paragraph::new(line)
                .block(block)
                .style(Styles::default())
                .scroll((0, scroll))
        };

        paragraph.render(area, buf);
    }
}
