//! HTTP/WebSocket server
//!
//! Assembles the axum application: the signaling WebSocket at `/ws`, the
//! per-stream media WebSocket at `/stream/:id`, the read-only API under
//! `/api`, and the PTZ control route. All shared state lives in one
//! [`AppState`] handed to every handler; there is no ambient global state.

pub mod api;
pub mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::error::Result;
use crate::ptz::PtzController;
use crate::registry::StreamRegistry;
use crate::session::SessionCoordinator;
use crate::signal::PeerMap;
use crate::stats::StatsCollector;
use crate::transcode::{FfmpegTranscoder, Transcoder};

/// Shared state handed to every handler
pub struct AppState {
    /// Session lifecycle coordinator
    pub coordinator: Arc<SessionCoordinator>,
    /// Stream registry (also reachable through the coordinator)
    pub registry: Arc<StreamRegistry>,
    /// Live signaling connections
    pub peers: Arc<PeerMap>,
    /// PTZ control collaborator
    pub ptz: Arc<PtzController>,
    /// Uptime and counters
    pub stats: StatsCollector,
}

/// The camera relay server
pub struct RelayServer {
    config: Config,
    state: Arc<AppState>,
}

impl RelayServer {
    /// Create a server that transcodes with the external ffmpeg binary
    pub fn new(config: Config) -> Self {
        let transcoder = Arc::new(FfmpegTranscoder::new(config.transcode.clone()));
        Self::with_transcoder(config, transcoder)
    }

    /// Create a server with a custom transcoder (tests use a fake producer)
    pub fn with_transcoder(config: Config, transcoder: Arc<dyn Transcoder>) -> Self {
        let registry = Arc::new(StreamRegistry::with_config(config.registry.clone()));
        let peers = Arc::new(PeerMap::new());
        let coordinator = Arc::new(SessionCoordinator::new(
            Arc::clone(&registry),
            Arc::clone(&peers),
            transcoder,
            config.ice.clone(),
            config.camera.rtsp_url(),
        ));
        let ptz = Arc::new(PtzController::new(&config.camera));

        let state = Arc::new(AppState {
            coordinator,
            registry,
            peers,
            ptz,
            stats: StatsCollector::new(),
        });

        Self { config, state }
    }

    /// Get a reference to the stream registry
    pub fn registry(&self) -> &Arc<StreamRegistry> {
        &self.state.registry
    }

    /// Build the axum application
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws::signaling_upgrade))
            .route("/stream/:id", get(ws::media_upgrade))
            .route("/api/streams", get(api::streams))
            .route("/api/stats", get(api::stats))
            .route("/api/health", get(api::health))
            .route("/api/ptz/move", post(api::ptz_move))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.state))
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Relay server listening");

        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Relay server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
