//! Signaling wire messages
//!
//! JSON messages exchanged over the signaling WebSocket, tagged by `type`.
//! Offer/answer/ICE payloads are opaque [`serde_json::Value`]s: the relay
//! never inspects or validates their internal structure, it only routes them
//! between the connections of a stream.

pub mod peers;
pub mod relay;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::IceConfig;
use crate::registry::{ConnectionId, StreamId, StreamSummary};

pub use peers::PeerMap;
pub use relay::SignalRelay;

/// Messages received from a connection
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Camera side registers and creates a stream
    RegisterPublisher {
        #[serde(default)]
        metadata: Value,
    },

    /// Browser side asks to join a stream
    #[serde(rename_all = "camelCase")]
    JoinStream { stream_id: StreamId },

    /// WebRTC offer, relayed to the stream group
    #[serde(rename_all = "camelCase")]
    Offer { stream_id: StreamId, offer: Value },

    /// WebRTC answer, relayed point-to-point
    Answer { to: ConnectionId, answer: Value },

    /// ICE candidate, relayed to a peer if `to` is set, else to the group
    #[serde(rename_all = "camelCase")]
    IceCandidate {
        #[serde(default)]
        stream_id: Option<StreamId>,
        #[serde(default)]
        to: Option<ConnectionId>,
        candidate: Value,
    },

    /// Request the list of active streams
    GetStreams,
}

/// Messages sent to a connection
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Reply to a successful publisher registration
    #[serde(rename_all = "camelCase")]
    StreamCreated {
        stream_id: StreamId,
        ice_servers: IceConfig,
    },

    /// Reply to a successful join
    #[serde(rename_all = "camelCase")]
    JoinedStream {
        stream_id: StreamId,
        ice_servers: IceConfig,
    },

    /// Broadcast to everyone else when a stream appears
    #[serde(rename_all = "camelCase")]
    NewStream { stream_id: StreamId, metadata: Value },

    /// Sent to each viewer when its stream is torn down
    #[serde(rename_all = "camelCase")]
    StreamEnded { stream_id: StreamId },

    /// Reply to `get-streams`
    StreamsList { streams: Vec<StreamSummary> },

    /// Relayed offer, tagged with the sender so the recipient can answer
    Offer { offer: Value, from: ConnectionId },

    /// Relayed answer
    Answer { answer: Value, from: ConnectionId },

    /// Relayed ICE candidate
    IceCandidate {
        candidate: Value,
        from: ConnectionId,
    },

    /// Structured rejection (see `RegistryError::reason` for the codes)
    Error { reason: String },
}
