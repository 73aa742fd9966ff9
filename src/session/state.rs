//! Connection role state machine
//!
//! Tracks what a signaling connection currently is: freshly connected and
//! unassigned, publisher of a stream, viewer of one or more streams, or
//! disconnected. A connection holds at most one publisher role; viewer roles
//! are unbounded and independent of the publisher role.

use std::collections::HashSet;

use crate::registry::{ConnectionId, StreamId};

/// Role state of one signaling connection
#[derive(Debug)]
pub struct ConnectionState {
    /// Connection id, allocated when the socket was accepted
    pub id: ConnectionId,

    /// Stream this connection publishes, if any
    publishing: Option<StreamId>,

    /// Streams this connection views
    viewing: HashSet<StreamId>,

    /// Terminal flag; no transitions after this
    disconnected: bool,
}

impl ConnectionState {
    /// Fresh, unassigned connection
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            publishing: None,
            viewing: HashSet::new(),
            disconnected: false,
        }
    }

    /// Whether the connection holds no role yet
    pub fn is_unassigned(&self) -> bool {
        self.publishing.is_none() && self.viewing.is_empty() && !self.disconnected
    }

    /// Mark the connection as publisher of `stream`
    ///
    /// Returns false (and changes nothing) if it already publishes a stream.
    pub fn set_publisher(&mut self, stream: StreamId) -> bool {
        if self.disconnected || self.publishing.is_some() {
            return false;
        }
        self.publishing = Some(stream);
        true
    }

    /// Stream this connection publishes, if any
    pub fn publishing(&self) -> Option<StreamId> {
        self.publishing
    }

    /// Add a viewer role for `stream`
    pub fn add_viewing(&mut self, stream: StreamId) {
        if !self.disconnected {
            self.viewing.insert(stream);
        }
    }

    /// Drop the viewer role for `stream`, if held
    pub fn remove_viewing(&mut self, stream: StreamId) {
        self.viewing.remove(&stream);
    }

    /// Whether this connection views `stream`
    pub fn is_viewing(&self, stream: StreamId) -> bool {
        self.viewing.contains(&stream)
    }

    /// Streams this connection views
    pub fn viewing(&self) -> &HashSet<StreamId> {
        &self.viewing
    }

    /// Enter the terminal disconnected state
    pub fn set_disconnected(&mut self) {
        self.disconnected = true;
    }

    /// Whether the connection has disconnected
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}
