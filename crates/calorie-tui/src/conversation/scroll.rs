//! Scroll state for the conversation pane.
//!
//! Offsets are counted in rendered lines from the bottom, so "follow the
//! latest entry" is simply offset zero.

/// Lines scrolled per mouse wheel tick.
pub const SCROLL_SPEED: usize = 3;

/// Conversation pane scroll state.
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Lines scrolled up from the bottom.
    offset: usize,
    /// Whether to stay pinned to the latest entry.
    follow: bool,
    /// Largest valid offset for the last rendered content.
    max_offset: usize,
    /// Visible height of the pane at the last render.
    viewport: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollState {
    /// Create a scroll state pinned to the bottom.
    pub fn new() -> Self {
        Self {
            offset: 0,
            follow: true,
            max_offset: 0,
            viewport: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Record the content and viewport size from the latest layout.
    pub fn set_bounds(&mut self, total_lines: usize, viewport: usize) {
        self.viewport = viewport;
        self.max_offset = total_lines.saturating_sub(viewport);
        if self.follow {
            self.offset = 0;
        } else {
            self.offset = self.offset.min(self.max_offset);
        }
    }

    /// Index of the first visible line for the given content and viewport.
    pub fn first_visible_line(&self, total_lines: usize, viewport: usize) -> usize {
        let max_offset = total_lines.saturating_sub(viewport);
        let offset = if self.follow {
            0
        } else {
            self.offset.min(max_offset)
        };
        max_offset - offset
    }

    /// Scroll towards older entries. Disables follow mode.
    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines).min(self.max_offset);
        self.follow = self.offset == 0;
    }

    /// Scroll towards newer entries. Re-enables follow at the bottom.
    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
        if self.offset == 0 {
            self.follow = true;
        }
    }

    /// Scroll up by one page.
    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport.saturating_sub(1).max(1));
    }

    /// Scroll down by one page.
    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport.saturating_sub(1).max(1));
    }

    /// Jump to the oldest entry.
    pub fn jump_to_start(&mut self) {
        self.offset = self.max_offset;
        self.follow = self.offset == 0;
    }

    /// Jump to the latest entry and follow new ones.
    pub fn jump_to_latest(&mut self) {
        self.offset = 0;
        self.follow = true;
    }
}
