//! Conversation log to display lines.
//!
//! Lines are wrapped here rather than by the paragraph so that the scroll
//! math works on exactly what gets drawn.

use calorie_engine::{ConversationEntry, ConversationState, ErrorEntry, EstimationResult};
use chrono::Local;
use ratatui::text::{Line, Span};

use super::placeholder::empty_conversation_hint;
use crate::ui::theme::{spinner_frame, Styles, Symbols};

/// Title of a result card.
pub const CARD_TITLE: &str = "Nutrition Estimation";

/// Width of the label column inside a result card.
const LABEL_WIDTH: usize = 13;

/// Render the whole conversation for a pane `width` columns wide.
///
/// Entries are separated by a blank line. While a request is in flight an
/// animated "Estimating..." line follows the last entry.
pub fn conversation_lines(state: &ConversationState, tick: usize, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width).max(1);
    let log = state.log();

    if log.is_empty() && !state.is_pending() {
        return empty_conversation_hint();
    }

    let mut lines = Vec::new();
    for (i, entry) in log.entries().iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        match entry {
            ConversationEntry::UserQuery { text } => push_query(&mut lines, text, width),
            ConversationEntry::EstimationResult(result) => push_result(&mut lines, result, width),
            ConversationEntry::Error(error) => push_error(&mut lines, error, width),
        }
    }

    if state.is_pending() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", spinner_frame(tick)), Styles::active()),
            Span::styled("Estimating...", Styles::dim()),
        ]));
    }

    lines
}

fn push_query(lines: &mut Vec<Line<'static>>, text: &str, width: usize) {
    let body_width = width.saturating_sub(Symbols::PROMPT.chars().count()).max(1);
    for (i, chunk) in textwrap::wrap(text, body_width).into_iter().enumerate() {
        let lead = if i == 0 { Symbols::PROMPT } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(lead, Styles::active()),
            Span::styled(chunk.into_owned(), Styles::highlight()),
        ]));
    }
}

fn push_result(lines: &mut Vec<Line<'static>>, result: &EstimationResult, width: usize) {
    let time = result.received_at.with_timezone(&Local).format("%H:%M:%S");
    lines.push(Line::from(vec![
        Span::styled(Symbols::CARD_TOP, Styles::border()),
        Span::styled(CARD_TITLE, Styles::title()),
        Span::styled(format!(" · {time}"), Styles::dim()),
    ]));

    let value_width = width
        .saturating_sub(Symbols::CARD_SIDE.chars().count() + LABEL_WIDTH + 1)
        .max(1);
    for (label, value) in result.estimate.rows() {
        for (i, chunk) in textwrap::wrap(&value, value_width).into_iter().enumerate() {
            let label = if i == 0 { label } else { "" };
            let value_style = if label == "Calories" {
                Styles::success()
            } else {
                Styles::default()
            };
            lines.push(Line::from(vec![
                Span::styled(Symbols::CARD_SIDE, Styles::border()),
                Span::styled(format!("{label:<LABEL_WIDTH$} "), Styles::dim()),
                Span::styled(chunk.into_owned(), value_style),
            ]));
        }
    }

    lines.push(Line::from(Span::styled(Symbols::CARD_BOTTOM, Styles::border())));
}

fn push_error(lines: &mut Vec<Line<'static>>, error: &ErrorEntry, width: usize) {
    let body_width = width.saturating_sub(Symbols::ERROR.chars().count()).max(1);
    let text = format!("Error: {}", error.message);
    for (i, chunk) in textwrap::wrap(&text, body_width).into_iter().enumerate() {
        let lead = if i == 0 { Symbols::ERROR } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(lead, Styles::error()),
            Span::styled(chunk.into_owned(), Styles::error()),
        ]));
    }
}
