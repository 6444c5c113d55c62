//! Hint shown while the conversation is empty.

use ratatui::text::{Line, Span};

use crate::ui::theme::Styles;

/// Lines shown in place of an empty log.
pub fn empty_conversation_hint() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled("No estimates yet.", Styles::dim())),
        Line::default(),
        Line::from(vec![
            Span::styled("Type a meal or ingredient below and press ", Styles::dim()),
            Span::styled("Enter", Styles::key_hint()),
            Span::styled(".", Styles::dim()),
        ]),
    ]
}
