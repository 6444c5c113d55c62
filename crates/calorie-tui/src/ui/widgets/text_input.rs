//! Draft input state: content, cursor and submission history.

/// State for the draft input, managing content and cursor position.
///
/// The cursor is a character index, not a byte offset, so multi-byte input
/// ("crème brûlée") edits correctly.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    /// The text content.
    content: String,
    /// Cursor position (character index).
    pub cursor: usize,
    /// Submitted drafts for up/down navigation.
    history: Vec<String>,
    /// Current history index (-1 = current input).
    history_index: isize,
    /// Saved current input when navigating history.
    saved_input: String,
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self {
            history_index: -1,
            ..Self::default()
        }
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of characters in the content.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Take the content, clearing the state.
    pub fn take(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        content
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Add current content to history and clear.
    pub fn submit(&mut self) -> String {
        let content = self.take();
        if !content.trim().is_empty() {
            self.history.push(content.clone());
        }
        self.history_index = -1;
        self.saved_input.clear();
        content
    }

    /// Navigate to previous history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }

        // Save current input if at the bottom
        if self.history_index == -1 {
            self.saved_input = self.content.clone();
        }

        let new_index = self.history_index + 1;
        #[allow(clippy::cast_sign_loss)]
        if (new_index as usize) < self.history.len() {
            self.history_index = new_index;
            #[allow(clippy::cast_sign_loss)]
            {
                self.content = self.history[self.history.len() - 1 - new_index as usize].clone();
            }
            self.move_end();
        }
    }

    /// Navigate to next history entry.
    pub fn history_next(&mut self) {
        if self.history_index <= 0 {
            // Restore saved input
            if self.history_index == 0 {
                self.content = std::mem::take(&mut self.saved_input);
                self.move_end();
            }
            self.history_index = -1;
            return;
        }

        self.history_index -= 1;
        #[allow(clippy::cast_sign_loss)]
        {
            self.content =
                self.history[self.history.len() - 1 - self.history_index as usize].clone();
        }
        self.move_end();
    }
}
