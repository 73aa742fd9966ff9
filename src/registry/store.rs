//! Stream registry implementation
//!
//! The central registry that manages all active streams. Creation, removal,
//! and the disconnect scan all complete under a single lock acquisition with
//! no await points between observation and mutation, so capacity and
//! ownership invariants cannot be violated by interleaved operations.

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use super::config::RegistryConfig;
use super::error::RegistryError;
use super::record::{ConnectionId, StreamId, StreamRecord, StreamSummary};

/// Viewers of a stream that was removed, so they can be notified
#[derive(Debug, Clone)]
pub struct EndedStream {
    /// Id of the removed stream
    pub id: StreamId,
    /// Viewers that were admitted at removal time
    pub viewers: Vec<ConnectionId>,
}

/// Result of detaching a connection from every stream it was part of
#[derive(Debug, Clone, Default)]
pub struct DetachOutcome {
    /// Streams the connection published; removed from the registry
    pub ended: Vec<EndedStream>,
    /// Streams the connection viewed; it was removed from their viewer sets
    pub left: Vec<StreamId>,
}

/// Central registry for all active streams
///
/// Thread-safe via `RwLock`. Read-heavy workloads (listings, membership
/// lookups for relaying) benefit from the concurrent read access.
pub struct StreamRegistry {
    /// Map of stream id to stream record
    pub(super) streams: RwLock<HashMap<StreamId, StreamRecord>>,

    /// Configuration
    config: RegistryConfig,
}

impl StreamRegistry {
    /// Create a new stream registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new stream registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create a stream owned by `publisher_id`
    ///
    /// Generates a fresh unique id and stores a record with an empty viewer
    /// set. Never fails: id generation is collision-free for the lifetime of
    /// the registry.
    pub async fn create_stream(&self, publisher_id: ConnectionId, metadata: Value) -> StreamSummary {
        let record = StreamRecord::new(publisher_id, metadata, &self.config);
        let summary = record.summary();

        let mut streams = self.streams.write().await;
        streams.insert(record.id, record);

        tracing::info!(
            stream = %summary.id,
            publisher = %publisher_id,
            "Stream created"
        );

        summary
    }

    /// Get a summary of a stream, if it exists
    pub async fn get(&self, id: StreamId) -> Option<StreamSummary> {
        let streams = self.streams.read().await;
        streams.get(&id).map(|record| record.summary())
    }

    /// Check whether a stream exists
    pub async fn contains(&self, id: StreamId) -> bool {
        self.streams.read().await.contains_key(&id)
    }

    /// Remove a stream, returning its final viewer set for notification
    ///
    /// Idempotent: removing an absent id is a no-op and returns `None`.
    pub async fn remove(&self, id: StreamId) -> Option<EndedStream> {
        let mut streams = self.streams.write().await;

        let record = streams.remove(&id)?;
        tracing::info!(
            stream = %id,
            viewers = record.viewer_count(),
            "Stream removed"
        );

        Some(EndedStream {
            id,
            viewers: record.viewers.into_iter().collect(),
        })
    }

    /// List summaries of all active streams
    ///
    /// The snapshot is taken under one read lock, so counts are consistent
    /// with each other.
    pub async fn list_active(&self) -> Vec<StreamSummary> {
        let streams = self.streams.read().await;
        streams.values().map(|record| record.summary()).collect()
    }

    /// All current members of a stream (publisher + viewers)
    ///
    /// Empty if the stream does not exist.
    pub async fn members(&self, id: StreamId) -> Vec<ConnectionId> {
        let streams = self.streams.read().await;
        streams
            .get(&id)
            .map(|record| record.members())
            .unwrap_or_default()
    }

    /// The stream owned by `publisher_id`, if any
    pub async fn stream_owned_by(&self, publisher_id: ConnectionId) -> Option<StreamId> {
        let streams = self.streams.read().await;
        streams
            .values()
            .find(|record| record.publisher_id == publisher_id)
            .map(|record| record.id)
    }

    /// Detach a connection from every stream it participates in
    ///
    /// Scans all streams: where the connection is the publisher, the stream
    /// is removed and its viewers are returned for notification; where it is
    /// a viewer, it is dropped from the viewer set. A connection can be
    /// publisher of one stream and viewer of others, so the whole scan always
    /// runs to completion.
    pub async fn detach_connection(&self, conn: ConnectionId) -> DetachOutcome {
        let mut streams = self.streams.write().await;
        let mut outcome = DetachOutcome::default();

        let owned: Vec<StreamId> = streams
            .values()
            .filter(|record| record.publisher_id == conn)
            .map(|record| record.id)
            .collect();

        for id in owned {
            if let Some(record) = streams.remove(&id) {
                tracing::info!(
                    stream = %id,
                    viewers = record.viewer_count(),
                    "Stream removed (publisher disconnected)"
                );
                outcome.ended.push(EndedStream {
                    id,
                    viewers: record.viewers.into_iter().collect(),
                });
            }
        }

        for record in streams.values_mut() {
            if record.viewers.remove(&conn) {
                tracing::debug!(
                    stream = %record.id,
                    viewer = %conn,
                    viewers = record.viewer_count(),
                    "Viewer removed (disconnected)"
                );
                outcome.left.push(record.id);
            }
        }

        outcome
    }

    /// Total number of active streams
    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }

    /// Total streams and total admitted viewers across all streams
    pub async fn totals(&self) -> (usize, usize) {
        let streams = self.streams.read().await;
        let viewers = streams.values().map(|record| record.viewer_count()).sum();
        (streams.len(), viewers)
    }

    /// Subscribe to a stream's media broadcast
    pub async fn subscribe_media(
        &self,
        id: StreamId,
    ) -> Result<broadcast::Receiver<Bytes>, RegistryError> {
        let streams = self.streams.read().await;
        streams
            .get(&id)
            .map(|record| record.subscribe())
            .ok_or(RegistryError::StreamNotFound(id))
    }

    /// Broadcast a media chunk to all subscribers of a stream
    ///
    /// Returns the number of receivers. Chunks for absent streams are
    /// dropped: the stream was already torn down.
    pub async fn broadcast_media(&self, id: StreamId, chunk: Bytes) -> usize {
        let streams = self.streams.read().await;
        streams.get(&id).map(|record| record.send(chunk)).unwrap_or(0)
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_create_stream_ids_are_distinct() {
        let registry = StreamRegistry::new();
        let publisher = ConnectionId::generate();

        let mut ids = Vec::new();
        for _ in 0..100 {
            let summary = registry.create_stream(publisher, json!({})).await;
            ids.push(summary.id);
        }

        let mut deduped = ids.clone();
        deduped.sort_by_key(|id| id.to_string());
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = StreamRegistry::new();
        let publisher = ConnectionId::generate();

        let summary = registry
            .create_stream(publisher, json!({"name": "Cam1"}))
            .await;

        let fetched = registry.get(summary.id).await.unwrap();
        assert_eq!(fetched.metadata["name"], "Cam1");
        assert_eq!(fetched.viewer_count, 0);
        assert!(registry.contains(summary.id).await);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = StreamRegistry::new();
        let publisher = ConnectionId::generate();

        let summary = registry.create_stream(publisher, json!({})).await;

        assert!(registry.remove(summary.id).await.is_some());
        assert!(registry.remove(summary.id).await.is_none());
        assert!(!registry.contains(summary.id).await);
    }

    #[tokio::test]
    async fn test_list_active() {
        let registry = StreamRegistry::new();
        let publisher_a = ConnectionId::generate();
        let publisher_b = ConnectionId::generate();

        registry.create_stream(publisher_a, json!({"name": "a"})).await;
        registry.create_stream(publisher_b, json!({"name": "b"})).await;

        let listed = registry.list_active().await;
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_stream_owned_by() {
        let registry = StreamRegistry::new();
        let publisher = ConnectionId::generate();
        let other = ConnectionId::generate();

        let summary = registry.create_stream(publisher, json!({})).await;

        assert_eq!(registry.stream_owned_by(publisher).await, Some(summary.id));
        assert_eq!(registry.stream_owned_by(other).await, None);
    }

    #[tokio::test]
    async fn test_detach_publisher_removes_stream_and_reports_viewers() {
        let registry = StreamRegistry::new();
        let publisher = ConnectionId::generate();
        let viewer = ConnectionId::generate();

        let summary = registry.create_stream(publisher, json!({})).await;
        registry.add_viewer(summary.id, viewer).await.unwrap();

        let outcome = registry.detach_connection(publisher).await;

        assert_eq!(outcome.ended.len(), 1);
        assert_eq!(outcome.ended[0].id, summary.id);
        assert_eq!(outcome.ended[0].viewers, vec![viewer]);
        assert!(outcome.left.is_empty());
        assert!(registry.list_active().await.is_empty());
    }

    #[tokio::test]
    async fn test_detach_viewer_leaves_stream_intact() {
        let registry = StreamRegistry::new();
        let publisher = ConnectionId::generate();
        let viewer_a = ConnectionId::generate();
        let viewer_b = ConnectionId::generate();

        let summary = registry.create_stream(publisher, json!({})).await;
        registry.add_viewer(summary.id, viewer_a).await.unwrap();
        registry.add_viewer(summary.id, viewer_b).await.unwrap();

        let outcome = registry.detach_connection(viewer_a).await;

        assert!(outcome.ended.is_empty());
        assert_eq!(outcome.left, vec![summary.id]);

        let fetched = registry.get(summary.id).await.unwrap();
        assert_eq!(fetched.viewer_count, 1);
    }

    #[tokio::test]
    async fn test_detach_covers_mixed_roles() {
        // Publisher of one stream, viewer of another
        let registry = StreamRegistry::new();
        let mixed = ConnectionId::generate();
        let other = ConnectionId::generate();

        let own = registry.create_stream(mixed, json!({})).await;
        let watched = registry.create_stream(other, json!({})).await;
        registry.add_viewer(watched.id, mixed).await.unwrap();

        let outcome = registry.detach_connection(mixed).await;

        assert_eq!(outcome.ended.len(), 1);
        assert_eq!(outcome.ended[0].id, own.id);
        assert_eq!(outcome.left, vec![watched.id]);
        assert!(registry.contains(watched.id).await);
    }

    #[tokio::test]
    async fn test_totals() {
        let registry = StreamRegistry::new();
        let publisher = ConnectionId::generate();

        let summary = registry.create_stream(publisher, json!({})).await;
        registry
            .add_viewer(summary.id, ConnectionId::generate())
            .await
            .unwrap();
        registry
            .add_viewer(summary.id, ConnectionId::generate())
            .await
            .unwrap();

        assert_eq!(registry.totals().await, (1, 2));
        assert_eq!(registry.stream_count().await, 1);
    }

    #[tokio::test]
    async fn test_media_fanout() {
        let registry = StreamRegistry::new();
        let publisher = ConnectionId::generate();

        let summary = registry.create_stream(publisher, json!({})).await;

        let mut rx1 = registry.subscribe_media(summary.id).await.unwrap();
        let mut rx2 = registry.subscribe_media(summary.id).await.unwrap();

        let delivered = registry
            .broadcast_media(summary.id, Bytes::from_static(b"\x47\x40"))
            .await;
        assert_eq!(delivered, 2);

        assert_eq!(rx1.recv().await.unwrap(), Bytes::from_static(b"\x47\x40"));
        assert_eq!(rx2.recv().await.unwrap(), Bytes::from_static(b"\x47\x40"));
    }

    #[tokio::test]
    async fn test_media_for_absent_stream_is_dropped() {
        let registry = StreamRegistry::new();
        let publisher = ConnectionId::generate();

        let summary = registry.create_stream(publisher, json!({})).await;
        registry.remove(summary.id).await;

        let delivered = registry
            .broadcast_media(summary.id, Bytes::from_static(b"x"))
            .await;
        assert_eq!(delivered, 0);

        assert!(matches!(
            registry.subscribe_media(summary.id).await,
            Err(RegistryError::StreamNotFound(_))
        ));
    }
}
