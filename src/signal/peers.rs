//! Connected peer map
//!
//! Maps connection ids to their outbound message channels. Registration
//! happens when the signaling socket is accepted, removal when it closes;
//! everything that wants to talk to a connection goes through here.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use super::ServerMessage;
use crate::registry::{ConnectionId, RegistryError};

/// Outbound channel sender for one connection
pub type PeerSender = mpsc::UnboundedSender<ServerMessage>;

/// Map of live connections to their outbound channels
#[derive(Default)]
pub struct PeerMap {
    peers: RwLock<HashMap<ConnectionId, PeerSender>>,
}

impl PeerMap {
    /// Create an empty peer map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound channel
    pub async fn register(&self, conn: ConnectionId, tx: PeerSender) {
        let mut peers = self.peers.write().await;
        peers.insert(conn, tx);
        tracing::debug!(connection = %conn, peers = peers.len(), "Peer registered");
    }

    /// Remove a connection; idempotent
    pub async fn unregister(&self, conn: ConnectionId) {
        let mut peers = self.peers.write().await;
        if peers.remove(&conn).is_some() {
            tracing::debug!(connection = %conn, peers = peers.len(), "Peer unregistered");
        }
    }

    /// Send a message to exactly one connection
    ///
    /// Fails with [`RegistryError::ConnectionGone`] if the connection is not
    /// registered or its channel is closed.
    pub async fn send(&self, conn: ConnectionId, msg: ServerMessage) -> Result<(), RegistryError> {
        let peers = self.peers.read().await;
        let tx = peers.get(&conn).ok_or(RegistryError::ConnectionGone(conn))?;
        tx.send(msg).map_err(|_| RegistryError::ConnectionGone(conn))
    }

    /// Send a message to every connection except `exclude`
    ///
    /// Returns the number of connections the message was handed to.
    pub async fn broadcast_except(&self, exclude: ConnectionId, msg: ServerMessage) -> usize {
        let peers = self.peers.read().await;
        let mut delivered = 0;

        for (conn, tx) in peers.iter() {
            if *conn == exclude {
                continue;
            }
            if tx.send(msg.clone()).is_ok() {
                delivered += 1;
            }
        }

        delivered
    }

    /// Number of registered connections
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Whether no connections are registered
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (PeerSender, mpsc::UnboundedReceiver<ServerMessage>) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn test_send_to_registered_peer() {
        let peers = PeerMap::new();
        let conn = ConnectionId::generate();
        let (tx, mut rx) = channel();

        peers.register(conn, tx).await;
        peers
            .send(
                conn,
                ServerMessage::Error {
                    reason: "test".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(ServerMessage::Error { .. })
        ));
    }

    #[tokio::test]
    async fn test_send_to_unknown_peer_is_connection_gone() {
        let peers = PeerMap::new();
        let conn = ConnectionId::generate();

        let result = peers
            .send(
                conn,
                ServerMessage::Error {
                    reason: "test".to_string(),
                },
            )
            .await;

        assert_eq!(result, Err(RegistryError::ConnectionGone(conn)));
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        let peers = PeerMap::new();
        let sender = ConnectionId::generate();
        let other = ConnectionId::generate();
        let (sender_tx, mut sender_rx) = channel();
        let (other_tx, mut other_rx) = channel();

        peers.register(sender, sender_tx).await;
        peers.register(other, other_tx).await;

        let delivered = peers
            .broadcast_except(
                sender,
                ServerMessage::Error {
                    reason: "hello".to_string(),
                },
            )
            .await;

        assert_eq!(delivered, 1);
        assert!(other_rx.recv().await.is_some());
        assert!(sender_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let peers = PeerMap::new();
        let conn = ConnectionId::generate();
        let (tx, _rx) = channel();

        peers.register(conn, tx).await;
        peers.unregister(conn).await;
        peers.unregister(conn).await;

        assert!(peers.is_empty().await);
    }
}
