//! Camera relay server wired from the environment
//!
//! Run with: cargo run --example relay_server
//!
//! Configuration comes from the environment (a `.env` file is honored):
//!   SERVER_PORT              HTTP/WebSocket port (default 3000)
//!   CAMERA_IP, CAMERA_USER, CAMERA_PASS
//!   RTSP_PORT, RTSP_PATH     RTSP source on the camera
//!   MAX_CLIENTS_PER_STREAM   viewer capacity per stream (default 50)
//!   STREAM_BITRATE, STREAM_FPS, FFMPEG_PATH
//!   WEBRTC_STUN_SERVERS      comma-separated STUN URLs
//!   WEBRTC_TURN_SERVER, WEBRTC_TURN_USERNAME, WEBRTC_TURN_PASSWORD
//!
//! ## Endpoints
//!
//! - `ws://host/ws`: signaling (register-publisher, join-stream, offer, ...)
//! - `ws://host/stream/<id>`: transcoded MPEG-TS bytes for one stream
//! - `GET /api/streams`, `GET /api/stats`, `GET /api/health`
//! - `POST /api/ptz/move`: `{"direction": "left", "durationMs": 500}`

use camrelay::{Config, RelayServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("camrelay=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    println!("Starting camera relay server on {}", config.bind_addr);
    println!();
    println!("=== Camera ===");
    println!("RTSP source: rtsp://{}:{}{}", config.camera.ip, config.camera.rtsp_port, config.camera.rtsp_path);
    println!("PTZ control: {}", config.camera.http_url());
    println!();
    println!("=== Clients ===");
    println!("Signaling:  ws://localhost:{}/ws", config.bind_addr.port());
    println!("API:        http://localhost:{}/api/streams", config.bind_addr.port());
    println!();

    let server = RelayServer::new(config);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    Ok(())
}
