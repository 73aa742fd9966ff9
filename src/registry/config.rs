//! Registry configuration

/// Configuration for the stream registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum viewers admitted per stream
    pub max_viewers_per_stream: usize,

    /// Media broadcast channel capacity (chunks buffered before slow
    /// subscribers start losing data)
    pub media_channel_capacity: usize,

    /// Descriptive bitrate label copied onto each new stream record
    pub bitrate: String,

    /// Descriptive frame rate copied onto each new stream record
    pub fps: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_viewers_per_stream: 50,
            media_channel_capacity: 64,
            bitrate: "1000k".to_string(),
            fps: 30,
        }
    }
}

impl RegistryConfig {
    /// Set the maximum viewers per stream
    pub fn max_viewers_per_stream(mut self, max: usize) -> Self {
        self.max_viewers_per_stream = max;
        self
    }

    /// Set the media broadcast channel capacity
    pub fn media_channel_capacity(mut self, capacity: usize) -> Self {
        self.media_channel_capacity = capacity;
        self
    }

    /// Set the descriptive bitrate label
    pub fn bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.bitrate = bitrate.into();
        self
    }

    /// Set the descriptive frame rate
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.max_viewers_per_stream, 50);
        assert_eq!(config.media_channel_capacity, 64);
        assert_eq!(config.bitrate, "1000k");
        assert_eq!(config.fps, 30);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RegistryConfig::default()
            .max_viewers_per_stream(2)
            .media_channel_capacity(16)
            .bitrate("500k")
            .fps(15);

        assert_eq!(config.max_viewers_per_stream, 2);
        assert_eq!(config.media_channel_capacity, 16);
        assert_eq!(config.bitrate, "500k");
        assert_eq!(config.fps, 15);
    }
}
