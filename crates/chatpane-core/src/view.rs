//! Render target abstraction for the chat controller
//!
//! The controller never touches a concrete UI. Anything that can show a
//! transcript, hold an input line, and toggle a send control implements
//! `ChatView`.

use crate::state::ChatMessage;
use crate::transcript::{Entry, NodeId, Transcript};

pub trait ChatView {
    /// Current contents of the input box
    fn input(&self) -> &str;

    fn clear_input(&mut self);

    fn append_message(&mut self, message: &ChatMessage) -> NodeId;

    /// Show the transient loading placeholder
    fn append_loading(&mut self) -> NodeId;

    /// Show an error node. `message` is the raw text without the "Error: " prefix.
    fn append_error(&mut self, message: &str) -> NodeId;

    /// Remove a node. Ids that are no longer present are ignored.
    fn remove_node(&mut self, id: NodeId);

    fn remove_welcome(&mut self);

    /// Drop every node and show only the welcome placeholder
    fn reset_to_welcome(&mut self);

    fn set_send_enabled(&mut self, enabled: bool);

    fn focus_input(&mut self) {}

    fn scroll_to_bottom(&mut self) {}
}

/// A view that keeps everything in memory.
///
/// Used by headless front-ends and tests; also a convenient base for views
/// that render from a `Transcript`.
#[derive(Debug, Clone, Default)]
pub struct MemoryView {
    pub transcript: Transcript,
    pub input: String,
    pub send_enabled: bool,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }
}

impl ChatView for MemoryView {
    fn input(&self) -> &str {
        &self.input
    }

    fn clear_input(&mut self) {
        self.input.clear();
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
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }
}
