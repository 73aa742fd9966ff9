//! Session lifecycle management
//!
//! Each signaling connection runs through an explicit state machine
//! ([`ConnectionState`]): it starts unassigned, becomes the publisher of at
//! most one stream and/or a viewer of any number of streams, and ends
//! disconnected. The [`SessionCoordinator`] reacts to connection events:
//! creating streams on publisher registration, gating viewer admission,
//! routing signaling traffic, and tearing everything down on disconnect.

pub mod coordinator;
pub mod state;

pub use coordinator::SessionCoordinator;
pub use state::ConnectionState;
