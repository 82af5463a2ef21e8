use thiserror::Error;

/// Failure of a single completion request.
///
/// `Network` and `Status` are transport-level failures; `Protocol` means the
/// endpoint answered 2xx with a body we could not turn into a message.
/// No variant ever carries the bearer credential.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("no API key configured (set OPENROUTER_API_KEY)")]
    MissingApiKey,
}

impl CompletionError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}
