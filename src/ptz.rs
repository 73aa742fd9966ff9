//! PTZ camera control
//!
//! Fire-and-forget pan/tilt/zoom control against the camera's Hi3510 CGI
//! endpoint. Each movement is an authenticated HTTP GET; timed moves issue a
//! delayed `stop` once the requested duration elapses. Failures are logged
//! and reported as unsuccessful, never escalated: losing a PTZ command does
//! not affect streaming.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::CameraConfig;

/// Per-request timeout for camera CGI calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Default movement speed for the Hi3510 protocol
const DEFAULT_SPEED: u32 = 45;

/// Supported PTZ movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PtzDirection {
    Left,
    Right,
    Up,
    Down,
    Stop,
    Home,
}

impl PtzDirection {
    /// CGI action string for this direction
    pub fn action(&self) -> &'static str {
        match self {
            PtzDirection::Left => "left",
            PtzDirection::Right => "right",
            PtzDirection::Up => "up",
            PtzDirection::Down => "down",
            PtzDirection::Stop => "stop",
            PtzDirection::Home => "home",
        }
    }

    /// Whether this direction starts a movement that needs a timed stop
    fn is_motion(&self) -> bool {
        !matches!(self, PtzDirection::Stop | PtzDirection::Home)
    }
}

/// HTTP client for the camera's PTZ control surface
pub struct PtzController {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    speed: u32,
}

impl PtzController {
    /// Create a controller for the given camera
    pub fn new(camera: &CameraConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: camera.http_url(),
            username: camera.username.clone(),
            password: camera.password.clone(),
            speed: DEFAULT_SPEED,
        }
    }

    /// Control URL for an action at a given speed
    fn control_url(&self, action: &str, speed: u32) -> String {
        format!(
            "{}/web/cgi-bin/hi3510/ptzctrl.cgi?-step=0&-act={}&-speed={}",
            self.base_url, action, speed
        )
    }

    /// Issue a single control command; true on HTTP success
    pub async fn control(&self, direction: PtzDirection) -> bool {
        let url = self.control_url(direction.action(), self.speed);

        match self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(direction = direction.action(), "PTZ control ok");
                true
            }
            Ok(resp) => {
                tracing::warn!(
                    direction = direction.action(),
                    status = %resp.status(),
                    "PTZ control rejected by camera"
                );
                false
            }
            Err(e) => {
                tracing::warn!(direction = direction.action(), error = %e, "PTZ control failed");
                false
            }
        }
    }

    /// Move the camera, stopping automatically after `duration_ms`
    ///
    /// `stop` and `home` are one-shot commands; everything else gets a
    /// delayed stop when a positive duration is given.
    pub async fn move_camera(self: Arc<Self>, direction: PtzDirection, duration_ms: u64) -> bool {
        let ok = self.control(direction).await;

        if ok && duration_ms > 0 && direction.is_motion() {
            let ptz = Arc::clone(&self);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(duration_ms)).await;
                ptz.control(PtzDirection::Stop).await;
            });
        }

        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PtzController {
        PtzController::new(&CameraConfig {
            ip: "10.0.0.5".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            rtsp_port: 554,
            rtsp_path: "/12".to_string(),
            http_port: 80,
        })
    }

    #[test]
    fn test_control_url() {
        let ptz = controller();

        assert_eq!(
            ptz.control_url("left", 45),
            "http://10.0.0.5:80/web/cgi-bin/hi3510/ptzctrl.cgi?-step=0&-act=left&-speed=45"
        );
    }

    #[test]
    fn test_direction_actions() {
        assert_eq!(PtzDirection::Left.action(), "left");
        assert_eq!(PtzDirection::Home.action(), "home");
        assert!(PtzDirection::Up.is_motion());
        assert!(!PtzDirection::Stop.is_motion());
        assert!(!PtzDirection::Home.is_motion());
    }

    #[test]
    fn test_direction_parses_lowercase() {
        let direction: PtzDirection = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(direction, PtzDirection::Down);

        assert!(serde_json::from_str::<PtzDirection>("\"sideways\"").is_err());
    }
}
