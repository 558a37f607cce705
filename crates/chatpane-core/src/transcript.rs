//! In-memory transcript model
//!
//! A `Transcript` is the ordered list of nodes a view shows. Front-ends keep
//! one and render from it; the controller only touches it through `ChatView`.

use crate::state::{ChatMessage, ChatRole};

pub const WELCOME_TITLE: &str = "Hi, I'm your AI Assistant";
pub const WELCOME_BODY: &str = "I can help you explore files, answer questions, and assist with various tasks. How can I help you today?";

/// Identifier of a node appended to a transcript.
///
/// Ids are never reused, even across resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Welcome,
    Message(ChatMessage),
    Loading,
    Error(String),
}

impl Entry {
    /// Text shown for an error node
    pub fn error_text(message: &str) -> String {
        format!("Error: {}", message)
    }
}

#[derive(Debug, Clone)]
pub struct Transcript {
    nodes: Vec<(NodeId, Entry)>,
    next_id: u64,
}

impl Transcript {
    /// A transcript showing only the welcome placeholder
    pub fn new() -> Self {
        let mut transcript = Self {
            nodes: Vec::new(),
            next_id: 0,
        };
        transcript.push(Entry::Welcome);
        transcript
    }

    pub fn push(&mut self, entry: Entry) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push((id, entry));
        id
    }

    /// Remove a node; unknown ids are ignored
    pub fn remove(&mut self, id: NodeId) -> Option<Entry> {
        let idx = self.nodes.iter().position(|(node_id, _)| *node_id == id)?;
        Some(self.nodes.remove(idx).1)
    }

    pub fn remove_welcome(&mut self) {
        self.nodes.retain(|(_, entry)| *entry != Entry::Welcome);
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
        self.push(Entry::Welcome);
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.nodes.iter().map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_welcome_only(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].1 == Entry::Welcome
    }

    pub fn has_loading(&self) -> bool {
        self.entries().any(|entry| *entry == Entry::Loading)
    }

    /// Messages in order, skipping placeholders and errors
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries().filter_map(|entry| match entry {
            Entry::Message(msg) => Some(msg),
            _ => None,
        })
    }

    pub fn messages_by(&self, role: ChatRole) -> impl Iterator<Item = &ChatMessage> {
        self.messages().filter(move |msg| msg.role == role)
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.entries().filter_map(|entry| match entry {
            Entry::Error(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
