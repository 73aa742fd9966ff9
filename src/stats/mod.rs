//! Server-wide statistics
//!
//! Read-only snapshot of registry totals plus process uptime, served at
//! `GET /api/stats`.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::registry::StreamRegistry;

/// Snapshot of server-wide counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    /// Active streams
    pub total_streams: usize,
    /// Admitted viewers across all streams
    pub total_viewers: usize,
    /// Seconds since the server started
    pub uptime_secs: u64,
}

/// Tracks server start time and produces stats snapshots
pub struct StatsCollector {
    started: Instant,
}

impl StatsCollector {
    /// Start counting uptime from now
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time since the collector was created
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Take a consistent snapshot of the registry totals
    pub async fn snapshot(&self, registry: &StreamRegistry) -> ServerStats {
        let (total_streams, total_viewers) = registry.totals().await;
        ServerStats {
            total_streams,
            total_viewers,
            uptime_secs: self.uptime().as_secs(),
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
