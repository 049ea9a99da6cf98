//! UseCase error types.

use thiserror::Error;

use crate::domain::{EnvelopeError, RepositoryError, ValueObjectError};

/// Errors while accepting a new connection
#[derive(Debug, Error)]
pub enum AcceptError {
    /// The configured connection limit has been reached
    #[error("connection limit of {0} reached")]
    CapacityExceeded(usize),

    #[error("failed to generate connection id: {0}")]
    IdGeneration(#[from] ValueObjectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors while handling an inbound message
///
/// None of these are reported to the client; the handler logs and drops.
#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    MalformedEnvelope(#[from] EnvelopeError),

    /// The sender is closing or already gone
    #[error("sender unavailable: {0}")]
    SenderUnavailable(#[from] RepositoryError),
}

/// Errors while looking up a room
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),
}
