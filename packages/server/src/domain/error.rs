//! Domain error types.

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("connection id must not be empty")]
    ConnectionIdEmpty,
}

/// Envelope parsing errors
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("envelope is not a JSON object")]
    NotAnObject,

    /// Body is not a well-formed document, or `room` is missing / not a string
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Room table (membership) errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error("connection '{0}' is already registered")]
    DuplicateConnection(String),

    #[error("connection '{0}' is no longer open")]
    ConnectionNotOpen(String),
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("connection '{0}' already exists")]
    DuplicateConnection(String),

    #[error("connection '{0}' is closing")]
    ConnectionClosing(String),

    #[error("room '{0}' not found")]
    RoomNotFound(String),
}

impl From<MembershipError> for RepositoryError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::ConnectionNotFound(id) => Self::ConnectionNotFound(id),
            MembershipError::DuplicateConnection(id) => Self::DuplicateConnection(id),
            MembershipError::ConnectionNotOpen(id) => Self::ConnectionClosing(id),
        }
    }
}

/// Message push errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("outbound queue of client '{0}' is full")]
    QueueFull(String),

    #[error("client '{0}' is closed")]
    ClientClosed(String),
}
