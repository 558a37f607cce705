use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatpane_core::{ChatBackend, ChatError, ChatReply};

use crate::app::App;

/// In-process backend for handler and render tests
#[derive(Default)]
pub struct StubBackend {
    reply: Mutex<Option<ChatReply>>,
    failing: bool,
    chat_calls: AtomicUsize,
    clear_calls: AtomicUsize,
}

impl StubBackend {
    pub fn replying(reply: ChatReply) -> Self {
        Self {
            reply: Mutex::new(Some(reply)),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }

    fn transport_error() -> ChatError {
        let err = serde_json::from_str::<ChatReply>("<html>").unwrap_err();
        ChatError::MalformedReply(err)
    }
}

#[async_trait]
impl ChatBackend for StubBackend {
    async fn send_chat(&self, _message: &str) -> Result<ChatReply, ChatError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Self::transport_error());
        }
        let reply = self.reply.lock().unwrap().clone();
        Ok(reply.unwrap_or_else(|| ChatReply::response("ok")))
    }

    async fn clear(&self) -> Result<(), ChatError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Self::transport_error());
        }
        Ok(())
    }
}

pub fn test_app(backend: Arc<StubBackend>) -> App {
    let backend: Arc<dyn ChatBackend> = backend;
    App::new(backend, "http://localhost:5001".to_string(), "You".to_string())
}
