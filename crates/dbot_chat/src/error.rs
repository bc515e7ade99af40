//! Error types for the chat system.

use thiserror::Error;

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Chat system errors.
///
/// The resolver and the conversation state machine are total and never
/// produce these; they come from loading data, configuration, the history
/// store and pipeline shutdown.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid knowledge base: {0}")]
    InvalidKnowledgeBase(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Message pipeline is closed")]
    PipelineClosed,

    #[error("Reply worker failed: {0}")]
    WorkerFailed(String),

    #[error("No async runtime: {0}")]
    NoRuntime(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
