//! Signaling message relay
//!
//! Routes opaque offer/answer/candidate messages between the connections of
//! a stream, or point-to-point to a single peer. The relay holds no state of
//! its own: membership comes from the registry, delivery goes through the
//! peer map. Forwarding failures (target gone) are dropped, never retried.

use std::sync::Arc;

use super::peers::PeerMap;
use super::ServerMessage;
use crate::registry::{ConnectionId, StreamId, StreamRegistry};

/// Stateless router for signaling messages
#[derive(Clone)]
pub struct SignalRelay {
    registry: Arc<StreamRegistry>,
    peers: Arc<PeerMap>,
}

impl SignalRelay {
    /// Create a relay over the given registry and peer map
    pub fn new(registry: Arc<StreamRegistry>, peers: Arc<PeerMap>) -> Self {
        Self { registry, peers }
    }

    /// Deliver a message to every current member of a stream except the sender
    ///
    /// Membership is the publisher plus all admitted viewers at the time of
    /// the call. Returns the number of deliveries.
    pub async fn relay_to_stream(
        &self,
        stream: StreamId,
        exclude: ConnectionId,
        msg: ServerMessage,
    ) -> usize {
        let members = self.registry.members(stream).await;
        let mut delivered = 0;

        for member in members {
            if member == exclude {
                continue;
            }
            match self.peers.send(member, msg.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    // Target raced with disconnect; drop silently
                    tracing::debug!(stream = %stream, error = %e, "Relay target gone");
                }
            }
        }

        delivered
    }

    /// Deliver a message to exactly one connection
    pub async fn relay_to_peer(&self, target: ConnectionId, msg: ServerMessage) {
        if let Err(e) = self.peers.send(target, msg).await {
            tracing::debug!(target = %target, error = %e, "Relay target gone");
        }
    }

    /// Deliver a message to every connection except `exclude`
    ///
    /// Used for server-wide announcements such as `new-stream`.
    pub async fn broadcast_all(&self, exclude: ConnectionId, msg: ServerMessage) -> usize {
        self.peers.broadcast_except(exclude, msg).await
    }
}
