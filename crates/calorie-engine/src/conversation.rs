//! Conversation state for the estimation client.
//!
//! The whole client state is one [`ConversationState`] snapshot. Every user
//! action and every request completion is a [`Transition`] applied by
//! value, producing the next snapshot plus the [`Effect`]s the caller must
//! carry out (clear the draft, dispatch a request, scroll). The reducer does
//! no I/O and never reads the clock, so it is fully testable headless.

use crate::estimate::{Estimate, EstimateError, EstimateRequest};
use chrono::{DateTime, Utc};
use tracing::debug;

/// A single entry in the conversation log.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEntry {
    /// Text the user submitted.
    UserQuery { text: String },
    /// Estimate returned for the preceding query.
    EstimationResult(EstimationResult),
    /// Failure reported for the preceding query.
    Error(ErrorEntry),
}

/// A successful estimate together with its arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResult {
    pub estimate: Estimate,
    pub received_at: DateTime<Utc>,
}

/// A failed request as shown in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub message: String,
    pub received_at: DateTime<Utc>,
}

/// Ordered, append-only log of entries. Can only be reset as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    /// All entries in chronological order.
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    fn push(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
    }

    fn reset(&mut self) {
        self.entries.clear();
    }
}

/// Identity of an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    id: u64,
    epoch: u64,
}

impl Ticket {
    /// Monotonic request id within the session.
    pub fn id(self) -> u64 {
        self.id
    }
}

/// Whether a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending(Ticket),
}

impl RequestState {
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending(_) => write!(f, "pending"),
        }
    }
}

/// Something that happens to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The user submitted draft text.
    Submit(String),
    /// The request identified by `ticket` returned an estimate.
    Succeeded {
        ticket: Ticket,
        estimate: Estimate,
        received_at: DateTime<Utc>,
    },
    /// The request identified by `ticket` failed with a user-facing message.
    Failed {
        ticket: Ticket,
        message: String,
        received_at: DateTime<Utc>,
    },
    /// Reset the log and the error banner.
    Clear,
    /// Hide the error banner.
    DismissError,
}

impl Transition {
    /// Build the completion transition for a finished request.
    pub fn completed(
        ticket: Ticket,
        result: Result<Estimate, EstimateError>,
        received_at: DateTime<Utc>,
    ) -> Self {
        match result {
            Ok(estimate) => Self::Succeeded {
                ticket,
                estimate,
                received_at,
            },
            Err(e) => Self::Failed {
                ticket,
                message: e.user_message(),
                received_at,
            },
        }
    }
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Empty the draft input.
    ClearDraft,
    /// Send `request`; report completion with `ticket`.
    Dispatch {
        ticket: Ticket,
        request: EstimateRequest,
    },
    /// The log changed; show the latest entry.
    ScrollToLatest,
}

/// Result of applying a transition.
#[derive(Debug, Clone)]
pub struct Step {
    pub state: ConversationState,
    pub effects: Vec<Effect>,
}

impl Step {
    fn unchanged(state: ConversationState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    /// The dispatch effect, if this step started a request.
    pub fn dispatch(&self) -> Option<(Ticket, &EstimateRequest)> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Dispatch { ticket, request } => Some((*ticket, request)),
            _ => None,
        })
    }
}

/// Snapshot of the conversation client.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    log: ConversationLog,
    request: RequestState,
    banner: Option<String>,
    /// Bumped by `Clear`; requests issued under an older epoch do not append.
    epoch: u64,
    next_ticket: u64,
}

impl ConversationState {
    /// Empty conversation, nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn request_state(&self) -> RequestState {
        self.request
    }

    pub fn is_pending(&self) -> bool {
        self.request.is_pending()
    }

    /// Text of the error banner, if one is showing.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// The query of the in-flight request (last user entry while pending).
    pub fn pending_query(&self) -> Option<&str> {
        if !self.is_pending() {
            return None;
        }
        self.log
            .entries()
            .iter()
            .rev()
            .find_map(|entry| match entry {
                ConversationEntry::UserQuery { text } => Some(text.as_str()),
                _ => None,
            })
    }

    /// Whether `draft` would be accepted by `Submit` right now.
    pub fn can_submit(&self, draft: &str) -> bool {
        !self.is_pending() && !draft.trim().is_empty()
    }

    /// Apply a transition, consuming this snapshot.
    #[must_use]
    pub fn apply(self, transition: Transition) -> Step {
        match transition {
            Transition::Submit(text) => self.submit(&text),
            Transition::Succeeded {
                ticket,
                estimate,
                received_at,
            } => self.complete(
                ticket,
                ConversationEntry::EstimationResult(EstimationResult {
                    estimate,
                    received_at,
                }),
            ),
            Transition::Failed {
                ticket,
                message,
                received_at,
            } => self.complete(
                ticket,
                ConversationEntry::Error(ErrorEntry {
                    message,
                    received_at,
                }),
            ),
            Transition::Clear => self.clear(),
            Transition::DismissError => self.dismiss_error(),
        }
    }

    fn submit(mut self, text: &str) -> Step {
        if !self.can_submit(text) {
            debug!(pending = self.is_pending(), "Ignoring submission");
            return Step::unchanged(self);
        }

        let request = EstimateRequest::new(text);
        let ticket = Ticket {
            id: self.next_ticket,
            epoch: self.epoch,
        };
        self.next_ticket += 1;

        self.log.push(ConversationEntry::UserQuery {
            text: request.food_item.clone(),
        });
        self.request = RequestState::Pending(ticket);
        self.banner = None;

        debug!(ticket = ticket.id, food_item = %request.food_item, "Submitted query");

        Step {
            state: self,
            effects: vec![
                Effect::ClearDraft,
                Effect::Dispatch { ticket, request },
                Effect::ScrollToLatest,
            ],
        }
    }

    fn complete(mut self, ticket: Ticket, entry: ConversationEntry) -> Step {
        if self.request != RequestState::Pending(ticket) {
            debug!(ticket = ticket.id, "Ignoring completion for unknown request");
            return Step::unchanged(self);
        }
        self.request = RequestState::Idle;

        if ticket.epoch != self.epoch {
            debug!(ticket = ticket.id, "Dropping result for a cleared conversation");
            return Step::unchanged(self);
        }

        if let ConversationEntry::Error(ref error) = entry {
            self.banner = Some(error.message.clone());
        }
        self.log.push(entry);

        Step {
            state: self,
            effects: vec![Effect::ScrollToLatest],
        }
    }

    fn clear(mut self) -> Step {
        self.log.reset();
        self.banner = None;
        self.epoch += 1;
        Step {
            state: self,
            effects: vec![Effect::ScrollToLatest],
        }
    }

    fn dismiss_error(mut self) -> Step {
        self.banner = None;
        Step::unchanged(self)
    }
}
