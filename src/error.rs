//! Error types for room projection.
//!
//! The reducer and the fold are total and never produce these; errors only
//! arise at the decoding boundary and in the room registry.

use crate::types::RoomId;
use thiserror::Error;

/// Main error type for projection operations.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid payload for event {name}: {reason}")]
    InvalidPayload { name: String, reason: String },

    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("Room already exists: {0}")]
    RoomExists(RoomId),

    #[error("Event for room {got} dispatched to room {expected}")]
    RoomMismatch { expected: RoomId, got: RoomId },

    #[error("Subscription was dropped")]
    SubscriptionDropped,
}

impl From<serde_json::Error> for ProjectionError {
    fn from(e: serde_json::Error) -> Self {
        ProjectionError::Deserialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for ProjectionError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        ProjectionError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for ProjectionError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        ProjectionError::Deserialization(e.to_string())
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
