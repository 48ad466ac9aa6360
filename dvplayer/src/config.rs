use std::time::Duration;

/// Default seek distance for the forward/rewind commands, about two seconds.
pub const DEFAULT_SEEK_STEP: i64 = 50;

/// Resolved settings for one playback session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Read commands from the terminal and show the status line.
    pub ui_enabled: bool,
    /// Frames moved by the forward/rewind commands.
    pub seek_step: i64,
    /// How long the session waits for a free packet slot before checking
    /// commands and the interrupt flag again.
    pub poll_interval: Duration,
    /// Maximum packets released in one transmitter iteration; older slots are
    /// reported as dropped.
    pub max_burst: u32,
    /// Emit status snapshots as JSON lines instead of a text status line.
    pub status_json: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ui_enabled: true,
            seek_step: DEFAULT_SEEK_STEP,
            poll_interval: Duration::from_millis(100),
            max_burst: 600,
            status_json: false,
        }
    }
}
