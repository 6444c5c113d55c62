//! The estimator screen: header, conversation, error banner, input and status bar.

use super::{render_help_overlay, Screen};
use crate::app::App;
use crate::conversation::ConversationPane;
use crate::ui::layout::estimator_layout;
use crate::ui::theme::Styles;
use crate::ui::widgets::{ErrorBanner, Header, InputBar, KeyHint, StatusBar};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Widget},
};

/// The single screen of the calorie TUI.
pub struct EstimatorScreen;

impl EstimatorScreen {
    fn hints(app: &App) -> Vec<KeyHint> {
        let mut hints = vec![
            KeyHint::new("Enter", "Estimate"),
            KeyHint::new("Ctrl+L", "Clear"),
        ];
        if app.conversation.banner().is_some() {
            hints.push(KeyHint::new("Esc", "Dismiss"));
        }
        hints.push(KeyHint::new("F1", "Help"));
        hints.push(KeyHint::new("Ctrl+C", "Quit"));
        hints
    }
}

impl Screen for EstimatorScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        Block::default().style(Styles::default()).render(area, buf);

        let layout = estimator_layout(area, app.conversation.banner().is_some());

        Header.render(layout.header, buf);

        ConversationPane::new(&app.conversation, &app.scroll)
            .tick(app.tick)
            .render(layout.conversation, buf);

        if let (Some(banner_area), Some(message)) = (layout.banner, app.conversation.banner()) {
            ErrorBanner::new(message).render(banner_area, buf);
        }

        InputBar::new(&app.input_state)
            .focused(!app.show_help)
            .loading(app.conversation.is_pending(), app.tick)
            .pending_query(app.conversation.pending_query())
            .render(layout.input, buf);

        StatusBar::new(app.mode_label())
            .hints(Self::hints(app))
            .right(&app.endpoint)
            .render(layout.status, buf);

        if app.show_help {
            render_help_overlay(area, buf);
        }
    }
}
