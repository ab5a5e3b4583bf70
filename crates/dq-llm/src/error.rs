use thiserror::Error;

/// Failures reaching or reading the chat endpoint.
///
/// None of these are retried; the caller reports them to the user as-is.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid chat client configuration: {0}")]
    Config(String),

    #[error("chat endpoint request failed")]
    Transport(#[from] reqwest::Error),

    #[error("chat endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("chat endpoint returned an empty reply")]
    EmptyReply,
}
