//! Reusable widgets for the calorie TUI.

mod error_banner;
mod header;
mod input_bar;
pub mod status_bar;
pub mod text_input;

pub use error_banner::ErrorBanner;
pub use header::Header;
pub use input_bar::{InputBar, INPUT_PLACEHOLDER};
pub use status_bar::{KeyHint, StatusBar};
pub use text_input::TextInputState;
