//! Domain errors.

use thiserror::Error;

/// Validation failures when constructing value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be zero")]
    ZeroUserId,

    #[error("user id '{0}' is not an unsigned 64-bit integer")]
    InvalidUserId(String),

    #[error("room id must not be empty")]
    EmptyRoomId,
}

/// Room manager operation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("player {0} is already in room '{1}'")]
    AlreadyInRoom(u64, String),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("room '{0}' is not accepting players")]
    RoomNotJoinable(String),

    #[error("room '{0}' is not being played")]
    RoomNotPlaying(String),
}

/// Failures while pushing messages to connections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
