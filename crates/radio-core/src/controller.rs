//! PlaybackController — current station, play/pause intent and volume.
//!
//! Owns the backend exclusively and drives it synchronously on the caller's
//! thread. Backend failures are logged and degrade to a stopped state; no
//! operation here returns an error.
//!
//! Notification: the single observer fires after `toggle_play_pause`,
//! `next_station` and `previous_station`. `play`/`play_current` on their own
//! stay silent.

use tracing::{debug, info, warn};

use crate::backend::{PlaybackError, PlayerBackend};
use crate::registry::StationRegistry;
use crate::station::Station;

pub const DEFAULT_VOLUME: i32 = 50;

type Observer = Box<dyn FnMut()>;

pub struct PlaybackController<B: PlayerBackend> {
    registry: StationRegistry,
    /// `None` when the backend could not be created, or after `release()`.
    backend: Option<B>,
    current_index: usize,
    is_playing: bool,
    volume: i32,
    on_state_changed: Option<Observer>,
}

impl<B: PlayerBackend> PlaybackController<B> {
    pub fn new(registry: StationRegistry, backend: B, volume: i32) -> Self {
        Self::with_backend(registry, Some(backend), volume)
    }

    /// Build the controller around a freshly created backend instance. A
    /// failing factory is logged and leaves the controller without a backend;
    /// every playback command then degrades to a no-op.
    pub fn create<F>(registry: StationRegistry, volume: i32, create_instance: F) -> Self
    where
        F: FnOnce() -> Result<B, PlaybackError>,
    {
        let backend = match create_instance() {
            Ok(b) => Some(b),
            Err(e) => {
                warn!("controller: backend unavailable: {}", e);
                None
            }
        };
        Self::with_backend(registry, backend, volume)
    }

    fn with_backend(registry: StationRegistry, backend: Option<B>, volume: i32) -> Self {
        Self {
            registry,
            backend,
            current_index: 0,
            is_playing: false,
            volume,
            on_state_changed: None,
        }
    }

    /// Register the observer, replacing any previous one.
    pub fn set_on_state_changed(&mut self, observer: impl FnMut() + 'static) {
        self.on_state_changed = Some(Box::new(observer));
    }

    // ── accessors ─────────────────────────────────────────────────────────────

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn current_station(&self) -> Option<&Station> {
        self.registry.station_at(self.current_index)
    }

    // ── playback ──────────────────────────────────────────────────────────────

    /// Stop whatever is playing, open `uri`, apply the volume and start.
    /// Any backend failure leaves `is_playing == false`.
    pub fn play(&mut self, uri: &str) {
        match self.try_play(uri) {
            Ok(()) => {
                info!("controller: playing {}", uri);
                self.is_playing = true;
            }
            Err(e) => {
                warn!("controller: error playing {}: {}", uri, e);
                self.is_playing = false;
            }
        }
    }

    fn try_play(&mut self, uri: &str) -> Result<(), PlaybackError> {
        let volume = self.volume;
        let backend = self.backend.as_mut().ok_or_else(|| {
            PlaybackError::BackendUnavailable("no player instance".to_string())
        })?;
        if let Err(e) = backend.stop() {
            debug!("controller: stop before open failed: {}", e);
        }
        backend.open(uri)?;
        backend.set_volume(volume)?;
        backend.play()
    }

    pub fn play_current(&mut self) {
        if let Some(uri) = self.current_station().map(|s| s.uri.clone()) {
            self.play(&uri);
        }
    }

    /// Pause or resume the loaded stream without re-opening it.
    pub fn toggle_play_pause(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            let result = if self.is_playing {
                backend.pause()
            } else {
                backend.play()
            };
            if let Err(e) = result {
                warn!("controller: toggle play/pause: {}", e);
            }
        }
        self.is_playing = !self.is_playing;
        debug!("controller: is_playing → {}", self.is_playing);
        self.notify();
    }

    pub fn next_station(&mut self) {
        let count = self.registry.count();
        if count == 0 {
            return;
        }
        self.switch_to((self.current_index + 1) % count);
    }

    pub fn previous_station(&mut self) {
        let count = self.registry.count();
        if count == 0 {
            return;
        }
        self.switch_to((self.current_index + count - 1) % count);
    }

    /// `is_playing` afterwards reflects whether the new stream actually
    /// started.
    fn switch_to(&mut self, index: usize) {
        self.current_index = index;
        self.play_current();
        self.notify();
    }

    /// Forward the volume to the backend. No clamping here; the backend
    /// clamps. Does not notify.
    pub fn set_volume(&mut self, volume: i32) {
        self.volume = volume;
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.set_volume(volume) {
                warn!("controller: set volume {}: {}", volume, e);
            }
        }
    }

    /// Stop the backend. `is_playing` is left as it was.
    pub fn stop(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.stop() {
                warn!("controller: stop: {}", e);
            }
        }
    }

    /// Stop playback and destroy the backend. Safe to call repeatedly and
    /// when no backend was ever created.
    pub fn release(&mut self) {
        self.stop();
        if let Some(mut backend) = self.backend.take() {
            info!("controller: releasing player backend");
            backend.release();
        }
    }

    fn notify(&mut self) {
        if let Some(observer) = self.on_state_changed.as_mut() {
            observer();
        }
    }
}

impl<B: PlayerBackend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        self.release();
    }
}
