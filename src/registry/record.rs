//! Stream records and identifier types
//!
//! This module defines the per-stream state stored in the registry and the
//! opaque identifiers for streams and connections.

use std::collections::HashSet;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::config::RegistryConfig;

/// Unique identifier for a stream, generated at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(Uuid);

impl StreamId {
    /// Generate a fresh stream id (v4, collision-free for registry lifetime)
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a signaling connection (publisher or viewer side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocate a fresh connection id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entry for a single stream in the registry
pub struct StreamRecord {
    /// Stream id, immutable after creation
    pub id: StreamId,

    /// Connection that owns this stream; never reassigned
    pub publisher_id: ConnectionId,

    /// Opaque metadata supplied by the publisher (name, location, source
    /// URL, resolution...); the registry never interprets it
    pub metadata: Value,

    /// Admitted viewer connections, bounded by the configured maximum
    pub viewers: HashSet<ConnectionId>,

    /// Creation time, set once
    pub created_at: DateTime<Utc>,

    /// Descriptive bitrate label, copied from configuration
    pub bitrate: String,

    /// Descriptive frame rate, copied from configuration
    pub fps: u32,

    /// Broadcast sender for media fan-out to subscribers
    pub(super) media_tx: broadcast::Sender<Bytes>,
}

impl StreamRecord {
    /// Create a new stream record with an empty viewer set
    pub(super) fn new(publisher_id: ConnectionId, metadata: Value, config: &RegistryConfig) -> Self {
        let (media_tx, _) = broadcast::channel(config.media_channel_capacity);

        Self {
            id: StreamId::generate(),
            publisher_id,
            metadata,
            viewers: HashSet::new(),
            created_at: Utc::now(),
            bitrate: config.bitrate.clone(),
            fps: config.fps,
            media_tx,
        }
    }

    /// Number of admitted viewers
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// All current members: the publisher plus every viewer
    pub(super) fn members(&self) -> Vec<ConnectionId> {
        let mut members = Vec::with_capacity(1 + self.viewers.len());
        members.push(self.publisher_id);
        members.extend(self.viewers.iter().copied());
        members
    }

    /// Read-only summary for listings
    pub fn summary(&self) -> StreamSummary {
        StreamSummary {
            id: self.id,
            metadata: self.metadata.clone(),
            viewer_count: self.viewer_count(),
            created_at: self.created_at,
        }
    }

    /// Subscribe to this stream's media broadcast channel
    pub(super) fn subscribe(&self) -> broadcast::Receiver<Bytes> {
        self.media_tx.subscribe()
    }

    /// Send a media chunk to all subscribers
    ///
    /// Returns the number of receivers, or 0 if nobody is subscribed.
    pub(super) fn send(&self, chunk: Bytes) -> usize {
        self.media_tx.send(chunk).unwrap_or(0)
    }
}

/// Read-only snapshot of a stream for listings and queries
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSummary {
    /// Stream id
    pub id: StreamId,
    /// Opaque publisher-supplied metadata
    pub metadata: Value,
    /// Number of admitted viewers at snapshot time
    pub viewer_count: usize,
    /// Creation time
    pub created_at: DateTime<Utc>,
}
