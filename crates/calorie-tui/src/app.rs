//! Application state and update logic for the calorie TUI.
//!
//! [`App`] wraps the engine's [`ConversationState`] with everything that only
//! exists on screen: the draft, scroll position, help overlay and animation
//! tick. All conversation changes go through [`App::apply`], which carries out
//! the effects the engine asks for.

use crate::conversation::{conversation_lines, ConversationPane, ScrollState, SCROLL_SPEED};
use crate::event::{key_to_action, mouse_to_action, Action};
use crate::ui::layout::estimator_layout;
use crate::ui::widgets::TextInputState;
use calorie_engine::{
    ConversationState, Effect, Estimate, EstimateError, EstimateRequest, Ticket, Transition,
    FALLBACK_ERROR_MESSAGE,
};
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::layout::Rect;
use tracing::{debug, warn};

/// A request the run loop must send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub request: EstimateRequest,
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Conversation snapshot owned by the engine reducer.
    pub conversation: ConversationState,

    /// Draft text being typed.
    pub input_state: TextInputState,

    /// Conversation pane scroll position.
    pub scroll: ScrollState,

    /// Animation tick counter.
    pub tick: usize,

    /// Endpoint shown in the status bar.
    pub endpoint: String,
}

impl App {
    /// Create a new application for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            conversation: ConversationState::new(),
            input_state: TextInputState::new(),
            scroll: ScrollState::new(),
            tick: 0,
            endpoint: endpoint.into(),
        }
    }

    /// Create an app for tests, pointed at the default local endpoint.
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self::new(calorie_engine::Config::default().endpoint())
    }

    /// Apply a transition and perform its effects.
    ///
    /// Returns the request to send when the transition started one.
    pub fn apply(&mut self, transition: Transition) -> Option<PendingRequest> {
        let state = std::mem::take(&mut self.conversation);
        let step = state.apply(transition);
        self.conversation = step.state;

        let mut dispatch = None;
        for effect in step.effects {
            match effect {
                Effect::ClearDraft => {
                    self.input_state.submit();
                }
                Effect::Dispatch { ticket, request } => {
                    dispatch = Some(PendingRequest { ticket, request });
                }
                Effect::ScrollToLatest => self.scroll.jump_to_latest(),
            }
        }
        dispatch
    }

    /// Submit the current draft.
    pub fn submit_draft(&mut self) -> Option<PendingRequest> {
        let draft = self.input_state.content().to_string();
        self.apply(Transition::Submit(draft))
    }

    /// Record the outcome of a finished request.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<Estimate, EstimateError>,
        received_at: DateTime<Utc>,
    ) {
        if let Err(e) = &result {
            warn!(ticket = ticket.id(), error = %e, "Estimate request failed");
        }
        self.apply(Transition::completed(ticket, result, received_at));
    }

    /// Record a request that never produced a result (the task died).
    pub fn abandon(&mut self, ticket: Ticket) {
        warn!(ticket = ticket.id(), "Estimate task ended without a result");
        self.apply(Transition::Failed {
            ticket,
            message: FALLBACK_ERROR_MESSAGE.to_string(),
            received_at: Utc::now(),
        });
    }

    /// Handle a key press. Returns a request to send if the key submitted one.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PendingRequest> {
        let action = key_to_action(key);

        if self.show_help {
            // Any key closes help; Ctrl+C still quits.
            self.show_help = false;
            if action == Action::Quit {
                self.should_quit = true;
            }
            return None;
        }

        if action != Action::None {
            return self.handle_action(action);
        }

        // The input is disabled while a request is in flight.
        if !self.conversation.is_pending() {
            self.edit_draft(key);
        }
        None
    }

    /// Handle a mouse event.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let action = mouse_to_action(mouse);
        if action != Action::None {
            self.handle_action(action);
        }
    }

    /// Handle an action. Returns a request to send if the action submitted one.
    pub fn handle_action(&mut self, action: Action) -> Option<PendingRequest> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Help => self.show_help = !self.show_help,
            Action::Submit => return self.submit_draft(),
            Action::Clear => {
                debug!("Clearing conversation");
                return self.apply(Transition::Clear);
            }
            Action::Back => {
                if self.conversation.banner().is_some() {
                    return self.apply(Transition::DismissError);
                }
            }
            Action::ScrollUp => self.scroll.scroll_up(SCROLL_SPEED),
            Action::ScrollDown => self.scroll.scroll_down(SCROLL_SPEED),
            Action::PageUp => self.scroll.page_up(),
            Action::PageDown => self.scroll.page_down(),
            Action::JumpToStart => self.scroll.jump_to_start(),
            Action::JumpToLatest => self.scroll.jump_to_latest(),
            Action::HistoryPrev => {
                if !self.conversation.is_pending() {
                    self.input_state.history_prev();
                }
            }
            Action::HistoryNext => {
                if !self.conversation.is_pending() {
                    self.input_state.history_next();
                }
            }
            Action::None => {}
        }
        None
    }

    fn edit_draft(&mut self, key: KeyEvent) {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char(c) if plain => self.input_state.insert(c),
            KeyCode::Backspace => self.input_state.backspace(),
            KeyCode::Delete => self.input_state.delete(),
            KeyCode::Left => self.input_state.move_left(),
            KeyCode::Right => self.input_state.move_right(),
            KeyCode::Home => self.input_state.move_home(),
            KeyCode::End => self.input_state.move_end(),
            _ => {}
        }
    }

    /// Advance the animation tick.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Update scroll bounds for a frame of size `area`.
    pub fn sync_viewport(&mut self, area: Rect) {
        let layout = estimator_layout(area, self.conversation.banner().is_some());
        let inner = ConversationPane::inner(layout.conversation);
        let total = conversation_lines(&self.conversation, self.tick, inner.width).len();
        self.scroll.set_bounds(total, usize::from(inner.height));
    }

    /// Mode label for the status bar.
    pub fn mode_label(&self) -> &'static str {
        if self.conversation.is_pending() {
            "ESTIMATING"
        } else {
            "READY"
        }
    }
}
