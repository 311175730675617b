use thiserror::Error;

/// Error taxonomy for the chat pipeline and its collaborators.
///
/// Every LLM failure is retried by the client; the variants exist so the
/// logs can tell a 429 from an upstream 5xx from a transport fault. The
/// retrieval layer and the chat handler recover from errors locally
/// rather than surfacing them to the caller.
#[derive(Error, Debug)]
pub enum NeedfulError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM rate limited (HTTP 429)")]
    LlmRateLimited,

    #[error("LLM API error: status {status}: {message}")]
    LlmApi { status: u16, message: String },

    #[error("LLM transport error: {0}")]
    LlmHttp(#[from] reqwest::Error),

    #[error("Conversation is empty: at least one message is required")]
    EmptyConversation,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NeedfulError>;
