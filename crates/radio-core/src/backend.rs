//! The narrow contract the playback controller needs from an audio engine.
//!
//! Every command is a non-blocking control request: the engine does its own
//! network/decode work on its own threads and the controller never waits on
//! it.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("stream not found: {0}")]
    NotFound(String),
    #[error("cannot decode stream: {0}")]
    DecodeFailure(String),
    #[error("network failure: {0}")]
    NetworkFailure(String),
    #[error("player backend unavailable: {0}")]
    BackendUnavailable(String),
}

pub trait PlayerBackend {
    /// Load `uri` as the current media, replacing whatever was loaded.
    fn open(&mut self, uri: &str) -> Result<(), PlaybackError>;

    /// Start or resume the current media.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self) -> Result<(), PlaybackError>;

    fn stop(&mut self) -> Result<(), PlaybackError>;

    /// Volume in percent. Out-of-range values are passed through as-is and
    /// the engine clamps.
    fn set_volume(&mut self, percent: i32) -> Result<(), PlaybackError>;

    /// Tear down the engine instance. Called at most once.
    fn release(&mut self);
}
