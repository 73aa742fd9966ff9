//! Session lifecycle coordinator
//!
//! Reacts to connection events: publisher registration creates a stream and
//! its transcode subprocess, viewer joins go through admission control,
//! signaling traffic is routed through the relay, and a disconnect tears down
//! everything the connection was part of. Cleanup always runs to completion:
//! one stream's teardown cannot prevent the rest of a connection's cleanup,
//! and nothing in here panics or propagates past the coordinator on the
//! disconnect path.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::sync::Mutex;

use crate::config::IceConfig;
use crate::error::Result;
use crate::registry::{ConnectionId, RegistryError, StreamId, StreamRegistry};
use crate::signal::{ClientMessage, PeerMap, ServerMessage, SignalRelay};
use crate::transcode::{ByteStream, TranscodeHandle, Transcoder};

use super::state::ConnectionState;

/// Coordinates stream lifecycle, admission, relaying, and teardown
pub struct SessionCoordinator {
    registry: Arc<StreamRegistry>,
    peers: Arc<PeerMap>,
    relay: SignalRelay,
    transcoder: Arc<dyn Transcoder>,

    /// Transcode handles, owned exclusively here on behalf of the publisher
    transcodes: Mutex<HashMap<StreamId, Box<dyn TranscodeHandle>>>,

    /// ICE servers handed to publishers and viewers on success replies
    ice: IceConfig,

    /// Camera source fed to the transcoder on publisher registration
    source_url: String,
}

impl SessionCoordinator {
    /// Create a coordinator over the shared registry and peer map
    pub fn new(
        registry: Arc<StreamRegistry>,
        peers: Arc<PeerMap>,
        transcoder: Arc<dyn Transcoder>,
        ice: IceConfig,
        source_url: impl Into<String>,
    ) -> Self {
        let relay = SignalRelay::new(Arc::clone(&registry), Arc::clone(&peers));
        Self {
            registry,
            peers,
            relay,
            transcoder,
            transcodes: Mutex::new(HashMap::new()),
            ice,
            source_url: source_url.into(),
        }
    }

    /// Shared stream registry
    pub fn registry(&self) -> &Arc<StreamRegistry> {
        &self.registry
    }

    /// Dispatch one incoming signaling message
    ///
    /// Updates the connection's role state on successful transitions. An
    /// `Err(Error::TranscodeSpawn)` means the connection should be closed;
    /// registry rejections have already been reported to the client.
    pub async fn handle_message(
        &self,
        state: &mut ConnectionState,
        msg: ClientMessage,
    ) -> Result<()> {
        match msg {
            ClientMessage::RegisterPublisher { metadata } => {
                let stream_id = self.register_publisher(state.id, metadata).await?;
                state.set_publisher(stream_id);
                Ok(())
            }
            ClientMessage::JoinStream { stream_id } => {
                if self.join_stream(state.id, stream_id).await.is_ok() {
                    state.add_viewing(stream_id);
                }
                Ok(())
            }
            ClientMessage::Offer { stream_id, offer } => {
                self.relay
                    .relay_to_stream(
                        stream_id,
                        state.id,
                        ServerMessage::Offer {
                            offer,
                            from: state.id,
                        },
                    )
                    .await;
                Ok(())
            }
            ClientMessage::Answer { to, answer } => {
                self.relay
                    .relay_to_peer(
                        to,
                        ServerMessage::Answer {
                            answer,
                            from: state.id,
                        },
                    )
                    .await;
                Ok(())
            }
            ClientMessage::IceCandidate {
                stream_id,
                to,
                candidate,
            } => {
                let msg = ServerMessage::IceCandidate {
                    candidate,
                    from: state.id,
                };
                if let Some(target) = to {
                    self.relay.relay_to_peer(target, msg).await;
                } else if let Some(stream) = stream_id {
                    self.relay.relay_to_stream(stream, state.id, msg).await;
                } else {
                    tracing::debug!(connection = %state.id, "Candidate without target, dropped");
                }
                Ok(())
            }
            ClientMessage::GetStreams => {
                self.send_stream_list(state.id).await;
                Ok(())
            }
        }
    }

    /// Register a publisher: start its transcode process and create a stream
    ///
    /// Rejected with `AlreadyPublishing` if the connection already owns a
    /// stream. A transcode spawn failure is reported to the connection once
    /// and returned so the caller closes the connection; no stream is created
    /// in that case.
    pub async fn register_publisher(
        &self,
        conn: ConnectionId,
        metadata: Value,
    ) -> Result<StreamId> {
        if self.registry.stream_owned_by(conn).await.is_some() {
            let err = RegistryError::AlreadyPublishing(conn);
            self.send_error(conn, &err).await;
            return Err(err.into());
        }

        let mut handle = match self.transcoder.start(&self.source_url) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(connection = %conn, error = %e, "Transcode spawn failed");
                let _ = self
                    .peers
                    .send(
                        conn,
                        ServerMessage::Error {
                            reason: "TranscodeFailed".to_string(),
                        },
                    )
                    .await;
                return Err(e);
            }
        };

        let summary = self.registry.create_stream(conn, metadata.clone()).await;

        if let Some(output) = handle.take_output() {
            spawn_media_pump(Arc::clone(&self.registry), summary.id, output);
        }
        self.transcodes.lock().await.insert(summary.id, handle);

        let _ = self
            .peers
            .send(
                conn,
                ServerMessage::StreamCreated {
                    stream_id: summary.id,
                    ice_servers: self.ice.clone(),
                },
            )
            .await;

        let notified = self
            .relay
            .broadcast_all(
                conn,
                ServerMessage::NewStream {
                    stream_id: summary.id,
                    metadata,
                },
            )
            .await;
        tracing::info!(
            stream = %summary.id,
            publisher = %conn,
            notified = notified,
            "Publisher registered"
        );

        Ok(summary.id)
    }

    /// Admit a viewer to a stream
    ///
    /// On acceptance the viewer receives `joined-stream` with the ICE server
    /// list; on rejection it receives a structured `error` and nothing is
    /// mutated.
    pub async fn join_stream(
        &self,
        conn: ConnectionId,
        stream_id: StreamId,
    ) -> std::result::Result<(), RegistryError> {
        match self.registry.add_viewer(stream_id, conn).await {
            Ok(()) => {
                let _ = self
                    .peers
                    .send(
                        conn,
                        ServerMessage::JoinedStream {
                            stream_id,
                            ice_servers: self.ice.clone(),
                        },
                    )
                    .await;
                Ok(())
            }
            Err(e) => {
                tracing::debug!(
                    stream = %stream_id,
                    viewer = %conn,
                    reason = e.reason(),
                    "Join rejected"
                );
                self.send_error(conn, &e).await;
                Err(e)
            }
        }
    }

    /// Send the active stream list to one connection
    pub async fn send_stream_list(&self, conn: ConnectionId) {
        let streams = self.registry.list_active().await;
        let _ = self
            .peers
            .send(conn, ServerMessage::StreamsList { streams })
            .await;
    }

    /// Tear down everything a connection was part of
    ///
    /// For every stream the connection published: kill the transcode process,
    /// notify each viewer once with `stream-ended`, and remove the stream.
    /// For every stream it viewed: drop it from the viewer set. Also removes
    /// the connection from the peer map. Idempotent; never fails.
    pub async fn disconnect(&self, conn: ConnectionId) {
        let outcome = self.registry.detach_connection(conn).await;

        for ended in &outcome.ended {
            // Kill before notifying so the subprocess never outlives its stream
            if let Some(mut handle) = self.transcodes.lock().await.remove(&ended.id) {
                handle.kill();
            }

            for viewer in &ended.viewers {
                let _ = self
                    .peers
                    .send(
                        *viewer,
                        ServerMessage::StreamEnded {
                            stream_id: ended.id,
                        },
                    )
                    .await;
            }
        }

        self.peers.unregister(conn).await;

        if !outcome.ended.is_empty() || !outcome.left.is_empty() {
            tracing::info!(
                connection = %conn,
                streams_ended = outcome.ended.len(),
                streams_left = outcome.left.len(),
                "Connection cleaned up"
            );
        }
    }

    async fn send_error(&self, conn: ConnectionId, err: &RegistryError) {
        let _ = self
            .peers
            .send(
                conn,
                ServerMessage::Error {
                    reason: err.reason().to_string(),
                },
            )
            .await;
    }
}

/// Forward transcode output chunks into the stream's media broadcast
fn spawn_media_pump(registry: Arc<StreamRegistry>, stream: StreamId, mut output: ByteStream) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; 8192];
        loop {
            match output.read(&mut buf).await {
                Ok(0) => {
                    tracing::info!(stream = %stream, "Transcode output ended");
                    break;
                }
                Ok(n) => {
                    registry
                        .broadcast_media(stream, Bytes::copy_from_slice(&buf[..n]))
                        .await;
                }
                Err(e) => {
                    tracing::warn!(stream = %stream, error = %e, "Transcode output read failed");
                    break;
                }
            }
        }
    });
}
