//! Conversation pane module.
//!
//! The conversation pane fills the middle of the screen:
//! - Every log entry, oldest first
//! - A pending indicator while a request is in flight
//! - Line-based scrolling that follows the latest entry

mod lines;
mod placeholder;
mod scroll;
mod widget;

pub use lines::conversation_lines;
pub use scroll::{ScrollState, SCROLL_SPEED};
pub use widget::ConversationPane;
