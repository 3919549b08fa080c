//! Action enum — every user intent the shell forwards to the controller.

/// Volume change per key press, in percent.
pub const VOLUME_STEP: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    TogglePause,
    Next,
    Prev,
    /// Absolute volume, already clamped to 0–100 by the shell.
    Volume(i32),
    VolumeUp,
    VolumeDown,

    // ── Window ───────────────────────────────────────────────────────────────
    Minimize,
    Restore,
    Quit,
}

impl Action {
    /// Volume after applying this action to `current`, if it changes volume.
    pub fn target_volume(self, current: i32) -> Option<i32> {
        match self {
            Action::Volume(v) => Some(v.clamp(0, 100)),
            Action::VolumeUp => Some((current + VOLUME_STEP).clamp(0, 100)),
            Action::VolumeDown => Some((current - VOLUME_STEP).clamp(0, 100)),
            _ => None,
        }
    }
}
