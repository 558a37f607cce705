//! The chat widget controller
//!
//! Owns the processing flag and drives a `ChatView` in response to user
//! actions and server replies. Each network operation is split into a
//! synchronous `begin_*` / `finish_*` pair so an event loop can run the
//! request on a background task; the `async` helpers compose the two for
//! callers that can simply await.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::api::{ChatBackend, ChatReply, ReplyOutcome};
use crate::error::ChatError;
use crate::state::ChatMessage;
use crate::transcript::NodeId;
use crate::view::ChatView;

pub const CONNECTION_FAILED: &str = "Failed to connect to server. Please check your connection.";
pub const CLEAR_PROMPT: &str = "Clear conversation history?";

/// Ticket for a chat request that has been started but not finished
#[derive(Debug)]
pub struct PendingChat {
    message: String,
    loading: NodeId,
}

impl PendingChat {
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Ticket for a confirmed clear request
#[derive(Debug)]
pub struct PendingClear {
    _private: (),
}

pub struct ChatController<V: ChatView> {
    backend: Arc<dyn ChatBackend>,
    view: V,
    processing: bool,
}

impl<V: ChatView> ChatController<V> {
    pub fn new(backend: Arc<dyn ChatBackend>, view: V) -> Self {
        let mut controller = Self {
            backend,
            view,
            processing: false,
        };
        controller.update_send_availability();
        controller
    }

    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view. Call `update_send_availability` after
    /// changing the input through it.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Whether a send would currently be accepted
    pub fn can_send(&self) -> bool {
        !self.view.input().trim().is_empty() && !self.processing
    }

    /// Recompute the send control state from the input and processing flag
    pub fn update_send_availability(&mut self) -> bool {
        let enabled = self.can_send();
        debug!(enabled, processing = self.processing, "send control state");
        self.view.set_send_enabled(enabled);
        enabled
    }

    /// Start sending the current input.
    ///
    /// Returns `None` without touching the view when the input is blank or a
    /// request is already in flight.
    pub fn begin_submit(&mut self) -> Option<PendingChat> {
        let message = self.view.input().trim().to_string();
        if message.is_empty() || self.processing {
            debug!(processing = self.processing, "submit ignored");
            return None;
        }

        self.view.remove_welcome();
        self.view.append_message(&ChatMessage::user(message.as_str()));
        self.view.clear_input();
        self.processing = true;
        self.update_send_availability();

        let loading = self.view.append_loading();
        self.view.scroll_to_bottom();

        info!(chars = message.chars().count(), "chat request started");
        Some(PendingChat { message, loading })
    }

    /// Render the result of a chat request and release the processing flag.
    pub fn finish_submit(&mut self, pending: PendingChat, result: Result<ChatReply, ChatError>) {
        self.view.remove_node(pending.loading);

        match result.map(ChatReply::into_outcome) {
            Ok(ReplyOutcome::Response(text)) => {
                self.view.append_message(&ChatMessage::assistant(text));
            }
            Ok(ReplyOutcome::Error(message)) => {
                info!(%message, "chat server reported an error");
                self.view.append_error(&message);
            }
            Err(err) => {
                error!(error = %err, "chat request failed");
                self.view.append_error(CONNECTION_FAILED);
            }
        }

        self.view.scroll_to_bottom();
        self.processing = false;
        self.update_send_availability();
        self.view.focus_input();
    }

    /// Send the current input and wait for the reply
    pub async fn submit_message(&mut self) {
        let Some(pending) = self.begin_submit() else {
            return;
        };

        let backend = self.backend();
        let result = backend.send_chat(pending.message()).await;
        self.finish_submit(pending, result);
    }

    /// Start clearing history if the user confirmed
    pub fn begin_clear(&mut self, confirmed: bool) -> Option<PendingClear> {
        if !confirmed {
            debug!("clear declined");
            return None;
        }
        Some(PendingClear { _private: () })
    }

    /// Reset the view after a clear request. Transport failures are logged and
    /// leave the transcript untouched; returns whether the view was reset.
    pub fn finish_clear(&mut self, _pending: PendingClear, result: Result<(), ChatError>) -> bool {
        match result {
            Ok(()) => {
                info!("conversation cleared");
                self.view.reset_to_welcome();
                true
            }
            Err(err) => {
                error!(error = %err, "error clearing chat");
                false
            }
        }
    }

    /// Ask for confirmation, clear server history and reset the view
    pub async fn clear_history<F>(&mut self, confirm: F) -> bool
    where
        F: FnOnce(&str) -> bool,
    {
        let Some(pending) = self.begin_clear(confirm(CLEAR_PROMPT)) else {
            return false;
        };

        let backend = self.backend();
        let result = backend.clear().await;
        self.finish_clear(pending, result)
    }
}
