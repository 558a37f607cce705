pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;
pub mod transcript;
pub mod view;

// Re-export main types for convenience
pub use api::{ChatBackend, ChatReply, HttpChatClient, ReplyOutcome};
pub use config::Config;
pub use controller::{ChatController, PendingChat, PendingClear, CLEAR_PROMPT, CONNECTION_FAILED};
pub use error::{ChatError, ConfigError};
pub use state::{ChatMessage, ChatRole};
pub use transcript::{Entry, NodeId, Transcript};
pub use view::{ChatView, MemoryView};
