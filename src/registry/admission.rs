//! Viewer admission control
//!
//! Enforces the per-stream viewer capacity. The capacity check and the
//! insertion happen under one write lock, so concurrent joins cannot both
//! observe room under the limit and overflow it.

use super::error::RegistryError;
use super::record::{ConnectionId, StreamId};
use super::store::StreamRegistry;

impl StreamRegistry {
    /// Admit a viewer to a stream
    ///
    /// Rejects with [`RegistryError::StreamNotFound`] if the stream does not
    /// exist and [`RegistryError::CapacityExceeded`] if the viewer set is at
    /// the configured maximum. Adding an already-admitted viewer is a no-op,
    /// not an error (set semantics).
    pub async fn add_viewer(
        &self,
        id: StreamId,
        viewer: ConnectionId,
    ) -> Result<(), RegistryError> {
        let mut streams = self.streams.write().await;

        let record = streams
            .get_mut(&id)
            .ok_or(RegistryError::StreamNotFound(id))?;

        if record.viewers.contains(&viewer) {
            return Ok(());
        }

        if record.viewers.len() >= self.config().max_viewers_per_stream {
            return Err(RegistryError::CapacityExceeded(id));
        }

        record.viewers.insert(viewer);
        tracing::info!(
            stream = %id,
            viewer = %viewer,
            viewers = record.viewer_count(),
            "Viewer admitted"
        );

        Ok(())
    }

    /// Remove a viewer from a stream
    ///
    /// No-op if the viewer is not in the set; silent if the stream is absent
    /// (already torn down).
    pub async fn remove_viewer(&self, id: StreamId, viewer: ConnectionId) {
        let mut streams = self.streams.write().await;

        if let Some(record) = streams.get_mut(&id) {
            if record.viewers.remove(&viewer) {
                tracing::debug!(
                    stream = %id,
                    viewer = %viewer,
                    viewers = record.viewer_count(),
                    "Viewer removed"
                );
            }
        }
    }
}
