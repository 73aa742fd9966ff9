//! Registry error types
//!
//! Error types for registry and admission operations. All of these are
//! recoverable at the connection boundary: the coordinator reports them back
//! to the requesting connection instead of tearing anything down.

use super::record::{ConnectionId, StreamId};

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Stream not found
    StreamNotFound(StreamId),
    /// Stream viewer set is at its configured maximum
    CapacityExceeded(StreamId),
    /// Connection already owns a stream
    AlreadyPublishing(ConnectionId),
    /// Relay target connection is gone
    ConnectionGone(ConnectionId),
}

impl RegistryError {
    /// Stable reason code sent to clients in `error` messages
    pub fn reason(&self) -> &'static str {
        match self {
            RegistryError::StreamNotFound(_) => "StreamNotFound",
            RegistryError::CapacityExceeded(_) => "CapacityExceeded",
            RegistryError::AlreadyPublishing(_) => "AlreadyPublishing",
            RegistryError::ConnectionGone(_) => "ConnectionGone",
        }
    }
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::StreamNotFound(id) => write!(f, "Stream not found: {}", id),
            RegistryError::CapacityExceeded(id) => {
                write!(f, "Stream at viewer capacity: {}", id)
            }
            RegistryError::AlreadyPublishing(conn) => {
                write!(f, "Connection already publishing: {}", conn)
            }
            RegistryError::ConnectionGone(conn) => write!(f, "Connection gone: {}", conn),
        }
    }
}

impl std::error::Error for RegistryError {}
