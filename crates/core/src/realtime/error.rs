use thiserror::Error;

/// Errors that can occur while publishing to or subscribing on a change feed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Change feed connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Subscribe failed: {0}")]
    SubscribeFailed(String),
    #[error("Publish failed: {0}")]
    PublishFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for change feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
