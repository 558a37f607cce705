use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChatError;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const EMPTY_REPLY: &str = "Server returned an empty reply";

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Body of a `/chat` reply. The server sends either `response` or `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Response(String),
    Error(String),
}

impl ChatReply {
    pub fn response(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            error: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            response: None,
            error: Some(text.into()),
        }
    }

    /// A non-empty `error` wins over `response`
    pub fn into_outcome(self) -> ReplyOutcome {
        match (self.error, self.response) {
            (Some(error), _) if !error.is_empty() => ReplyOutcome::Error(error),
            (_, Some(response)) => ReplyOutcome::Response(response),
            _ => ReplyOutcome::Error(EMPTY_REPLY.to_string()),
        }
    }
}

/// Network side of the chat widget
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_chat(&self, message: &str) -> Result<ChatReply, ChatError>;

    /// Ask the server to forget the conversation
    async fn clear(&self) -> Result<(), ChatError>;
}

#[derive(Clone)]
pub struct HttpChatClient {
    client: Client,
    base_url: String,
}

impl HttpChatClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            client: builder.build().unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    async fn send_chat(&self, message: &str) -> Result<ChatReply, ChatError> {
        let url = format!("{}/chat", self.base_url);
        debug!(%url, "sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        // Error payloads come with 4xx/5xx, so decode regardless of status
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "chat server returned non-success status");
        }

        let body = response.bytes().await?;
        let reply: ChatReply = serde_json::from_slice(&body)?;
        debug!(%status, has_error = reply.error.is_some(), "chat reply received");
        Ok(reply)
    }

    async fn clear(&self) -> Result<(), ChatError> {
        let url = format!("{}/clear", self.base_url);
        debug!(%url, "sending clear request");

        let response = self.client.post(&url).send().await?;
        debug!(status = %response.status(), "clear request completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ChatController, CONNECTION_FAILED};
    use crate::view::MemoryView;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn echo(Json(body): Json<Value>) -> Json<Value> {
        let message = body["message"].as_str().unwrap_or_default().to_string();
        Json(json!({ "response": format!("echo: {}", message) }))
    }

    async fn broken() -> (StatusCode, Json<Value>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Agent not initialized - API key missing" })),
        )
    }

    // Answers well after the short client timeouts used below
    async fn slow() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Json(json!({ "response": "too late" }))
    }

    #[test]
    fn test_outcome_prefers_error() {
        let reply = ChatReply {
            response: Some("hi".into()),
            error: Some("nope".into()),
        };
        assert_eq!(reply.into_outcome(), ReplyOutcome::Error("nope".into()));
    }

    #[test]
    fn test_outcome_empty_error_falls_back_to_response() {
        let reply = ChatReply {
            response: Some("hi".into()),
            error: Some(String::new()),
        };
        assert_eq!(reply.into_outcome(), ReplyOutcome::Response("hi".into()));
    }

    #[test]
    fn test_outcome_neither_field() {
        assert_eq!(
            ChatReply::default().into_outcome(),
            ReplyOutcome::Error(EMPTY_REPLY.into())
        );
    }

    #[test]
    fn test_reply_ignores_unknown_fields() {
        let reply: ChatReply = serde_json::from_str(r#"{"response":"ok","status":"done"}"#).unwrap();
        assert_eq!(reply, ChatReply::response("ok"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpChatClient::new("http://localhost:5001/");
        assert_eq!(client.base_url(), "http://localhost:5001");
    }

    #[tokio::test]
    async fn test_send_chat_posts_message() {
        let url = spawn_server(Router::new().route("/chat", post(echo))).await;
        let client = HttpChatClient::new(&url);

        let reply = client.send_chat("Hello").await.unwrap();
        assert_eq!(reply.into_outcome(), ReplyOutcome::Response("echo: Hello".into()));
    }

    #[tokio::test]
    async fn test_send_chat_decodes_error_status_body() {
        let url = spawn_server(Router::new().route("/chat", post(broken))).await;
        let client = HttpChatClient::new(&url);

        let reply = client.send_chat("Hello").await.unwrap();
        assert_eq!(
            reply.into_outcome(),
            ReplyOutcome::Error("Agent not initialized - API key missing".into())
        );
    }

    #[tokio::test]
    async fn test_send_chat_non_json_body_is_malformed() {
        let app = Router::new().route("/chat", post(|| async { "<html>oops</html>" }));
        let url = spawn_server(app).await;
        let client = HttpChatClient::new(&url);

        let err = client.send_chat("Hello").await.unwrap_err();
        assert!(matches!(err, ChatError::MalformedReply(_)));
    }

    #[tokio::test]
    async fn test_clear_ignores_response_body() {
        let app = Router::new().route("/clear", post(|| async { Json(json!({ "status": "ok" })) }));
        let url = spawn_server(app).await;
        let client = HttpChatClient::new(&url);

        assert!(client.clear().await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_port_is_request_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpChatClient::new(&format!("http://{}", addr));
        let err = client.send_chat("Hello").await.unwrap_err();
        assert!(matches!(err, ChatError::Request(_)));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let url = spawn_server(Router::new().route("/chat", post(slow))).await;
        let client = HttpChatClient::with_timeout(&url, Some(Duration::from_millis(100)));

        let err = client.send_chat("Hello").await.unwrap_err();
        match err {
            ChatError::Request(inner) => assert!(inner.is_timeout()),
            other => panic!("expected request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_shows_connection_error() {
        let url = spawn_server(Router::new().route("/chat", post(slow))).await;
        let client = HttpChatClient::with_timeout(&url, Some(Duration::from_millis(100)));
        let mut controller = ChatController::new(Arc::new(client), MemoryView::with_input("Hello"));

        controller.submit_message().await;

        let view = controller.view();
        assert_eq!(view.transcript.errors().collect::<Vec<_>>(), vec![CONNECTION_FAILED]);
        assert!(!view.transcript.has_loading());
        assert!(!controller.is_processing());
    }
}
