//! Test utilities for calorie-tui rendering tests.
//!
//! Helpers for creating test terminals, rendering screens and converting
//! buffers to plain strings for content assertions.

use crate::app::App;
use crate::screens::Screen;
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};
use unicode_width::UnicodeWidthStr;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with the default dimensions (80x24).
pub fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(TEST_WIDTH, TEST_HEIGHT);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a test app pointed at the default endpoint.
pub fn create_test_app() -> App {
    App::new_for_test()
}

/// Convert a buffer to a string, one line per row, trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        // Cells hidden behind a wide character are skipped
        let mut skip = 0;
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                if skip == 0 {
                    result.push_str(cell.symbol());
                }
                skip = skip.max(cell.symbol().width()).saturating_sub(1);
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: Screen>(screen: &S, app: &App) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render a screen at custom dimensions and return it as a string.
pub fn render_screen_to_string_sized<S: Screen>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());
        buffer.set_string(0, 1, "World", ratatui::style::Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld\n");
    }

    #[test]
    fn test_buffer_to_string_wide_chars() {
        let area = Rect::new(0, 0, 10, 1);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "食物ok", ratatui::style::Style::default());

        assert_eq!(buffer_to_string(&buffer), "食物ok");
    }
}
