//! Stream registry for publisher/viewer routing
//!
//! The registry manages active streams: one publisher connection owns each
//! stream, viewers are admitted up to a configured capacity, and the
//! transcoded media bytes fan out to subscribers over
//! `tokio::sync::broadcast`.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<StreamRegistry>
//!                   ┌────────────────────────────┐
//!                   │ streams: HashMap<StreamId, │
//!                   │   StreamRecord {           │
//!                   │     publisher_id,          │
//!                   │     viewers: HashSet,      │
//!                   │     media_tx: broadcast,   │
//!                   │   }                        │
//!                   │ >                          │
//!                   └─────────────┬──────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!    [Publisher]              [Viewer]                [Viewer]
//!    broadcast_media()     media_rx.recv()        media_rx.recv()
//! ```
//!
//! # Zero-Copy Design
//!
//! Media chunks are `bytes::Bytes`, so all subscribers share one allocation;
//! the broadcast channel clones only the reference-counted handle.

pub mod admission;
pub mod config;
pub mod error;
pub mod record;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use record::{ConnectionId, StreamId, StreamSummary};
pub use store::{DetachOutcome, EndedStream, StreamRegistry};
