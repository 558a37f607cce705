//! Terminal implementation of `ChatView`
//!
//! Holds the transcript, the multi-line input editor and the scroll position
//! of the chat pane. `ui.rs` renders straight from this state.

use chatpane_core::{ChatMessage, ChatView, Entry, NodeId, Transcript};

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone)]
pub struct TerminalView {
    pub transcript: Transcript,
    pub input: String,
    /// Cursor position in `input`, in characters
    pub cursor: usize,
    pub send_enabled: bool,
    pub input_focused: bool,
    /// First visible line of the chat pane
    pub scroll: u16,
    /// Keep the chat pane pinned to its last line on the next render
    pub follow_bottom: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            input: String::new(),
            cursor: 0,
            send_enabled: false,
            input_focused: true,
            scroll: 0,
            follow_bottom: true,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Row and column of the cursor inside the input, in characters
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before: String = self.input.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        (row, col)
    }

    pub fn input_line_count(&self) -> usize {
        self.input.split('\n').count()
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Scrolling past the end is clamped at render time, which also re-pins
    /// the pane to the bottom
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView for TerminalView {
    fn input(&self) -> &str {
        &self.input
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn append_message(&mut self, message: &ChatMessage) -> NodeId {
        self.transcript.push(Entry::Message(message.clone()))
    }

    fn append_loading(&mut self) -> NodeId {
        self.transcript.push(Entry::Loading)
    }

    fn append_error(&mut self, message: &str) -> NodeId {
        self.transcript.push(Entry::Error(message.to_string()))
    }

    fn remove_node(&mut self, id: NodeId) {
        self.transcript.remove(id);
    }

    fn remove_welcome(&mut self) {
        self.transcript.remove_welcome();
    }

    fn reset_to_welcome(&mut self) {
        self.transcript.reset();
        self.scroll = 0;
        self.follow_bottom = true;
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }

    fn focus_input(&mut self) {
        self.input_focused = true;
    }

    fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TerminalView {
        let mut view = TerminalView::new();
        for c in text.chars() {
            view.insert_char(c);
        }
        view
    }

    #[test]
    fn test_editing_is_utf8_safe() {
        let mut view = typed("héllo");
        view.move_left();
        view.move_left();
        view.backspace();
        assert_eq!(view.input, "hélo");

        view.move_home();
        view.move_right();
        view.delete();
        assert_eq!(view.input, "hlo");
        assert_eq!(view.cursor, 1);
    }

    #[test]
    fn test_cursor_row_col_multiline() {
        let mut view = typed("first");
        view.insert_newline();
        for c in "ab".chars() {
            view.insert_char(c);
        }

        assert_eq!(view.cursor_row_col(), (1, 2));
        assert_eq!(view.input_line_count(), 2);
    }

    #[test]
    fn test_clear_input_resets_cursor() {
        let mut view = typed("hello");
        view.clear_input();
        assert_eq!(view.cursor, 0);
        assert!(view.input.is_empty());
    }

    #[test]
    fn test_scroll_up_unpins_bottom() {
        let mut view = TerminalView::new();
        view.scroll = 10;
        view.scroll_up(3);
        assert_eq!(view.scroll, 7);
        assert!(!view.follow_bottom);

        view.scroll_to_bottom();
        assert!(view.follow_bottom);
    }
}
