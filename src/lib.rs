//! # camrelay
//!
//! RTSP camera relay server: pulls a camera's RTSP feed through an external
//! transcode subprocess, fans the stream out to browser clients over
//! WebSocket/WebRTC signaling, and exposes PTZ control over HTTP.
//!
//! The core is the stream session manager: the [`registry`] tracks active
//! streams and enforces per-stream viewer capacity, the [`session`]
//! coordinator reacts to connect/disconnect events and owns the transcode
//! subprocesses, and the [`signal`] relay routes opaque offer/answer/ICE
//! messages between a stream's publisher and its viewers.
//!
//! # Quick start
//!
//! ```no_run
//! use camrelay::{Config, RelayServer};
//!
//! #[tokio::main]
//! async fn main() -> camrelay::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = RelayServer::new(config);
//!     server.run().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod ptz;
pub mod registry;
pub mod server;
pub mod session;
pub mod signal;
pub mod stats;
pub mod transcode;

pub use config::{CameraConfig, Config, IceConfig, IceServer, TranscodeConfig};
pub use error::{Error, Result};
pub use ptz::{PtzController, PtzDirection};
pub use registry::{ConnectionId, RegistryConfig, RegistryError, StreamId, StreamRegistry};
pub use server::RelayServer;
pub use session::{ConnectionState, SessionCoordinator};
pub use signal::{ClientMessage, PeerMap, ServerMessage, SignalRelay};
pub use stats::{ServerStats, StatsCollector};
pub use transcode::{FfmpegTranscoder, TranscodeHandle, Transcoder};
