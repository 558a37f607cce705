use thiserror::Error;

/// Failure talking to the chat server.
///
/// Every variant is a transport-kind failure from the widget's point of view.
/// Application errors reported by the server arrive inside a successful
/// `ChatReply` instead.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to chat server failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("chat server returned a malformed reply: {0}")]
    MalformedReply(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}
