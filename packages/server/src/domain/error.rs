//! Domain error types.

use thiserror::Error;

/// Errors raised while constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("room id must not be empty")]
    EmptyRoomId,

    /// The id cannot be used as a numeric store/directory key
    #[error("user id '{0}' is not an unsigned 32-bit integer")]
    MalformedUserId(String),
}

/// Errors raised when a user may not join a room
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("private room id '{0}' is malformed")]
    MalformedPrivateRoom(String),

    #[error("user '{user_id}' is not a participant of private room '{room_id}'")]
    NotAParticipant { user_id: String, room_id: String },
}

/// Errors returned by the message store and user directory collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("user {0} not found")]
    UserNotFound(u32),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Errors returned by a [`Connection`](super::Connection)
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The peer closed the connection or it was closed locally
    #[error("connection closed")]
    Closed,

    #[error("no frame received within {0:?}")]
    IdleTimeout(std::time::Duration),

    /// One frame could not be read as text; later frames are unaffected
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("transport error: {0}")]
    Transport(String),
}
