//! Transcode subprocess capability
//!
//! The session coordinator treats the media converter as an injected
//! capability: something that can be started for an input URL and then
//! produces an opaque byte stream until it is killed. Production uses the
//! external ffmpeg binary ([`FfmpegTranscoder`]); tests substitute a fake
//! producer.

pub mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

use tokio::io::AsyncRead;

use crate::error::Result;

/// Opaque byte-stream output of a transcode process
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Capability to start transcode processes
pub trait Transcoder: Send + Sync {
    /// Start a transcode process reading from `input_url`
    fn start(&self, input_url: &str) -> Result<Box<dyn TranscodeHandle>>;
}

/// Handle to one running transcode process
///
/// Owned exclusively by the session coordinator on behalf of the publisher
/// connection; nothing else writes to or terminates the process.
pub trait TranscodeHandle: Send {
    /// Take the process's byte-stream output
    ///
    /// Returns `None` once the output has been taken.
    fn take_output(&mut self) -> Option<ByteStream>;

    /// Terminate the process; safe to call more than once
    fn kill(&mut self);

    /// OS process id, if available
    fn id(&self) -> Option<u32>;
}
