use crate::dif::VideoStandard;
use crate::error::{DvError, Result};
use crate::source::FrameSource;

/// A playback request posted by the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    TogglePause,
    /// Relative seek in frames.
    Seek(i64),
}

/// What [`PlaybackController::apply_pending_at_boundary`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Pause(bool),
    /// Seek that moved the frame index to `frame`; the next load reads `target`.
    Seek { frame: u64, target: u64 },
}

/// Pause/seek state machine.
///
/// Intents are only recorded by the `request_*` methods; they take effect in
/// [`PlaybackController::apply_pending_at_boundary`], which the driver calls
/// once per frame boundary. One slot per intent kind: a newer request of the
/// same kind replaces an unconsumed older one.
#[derive(Debug, Default)]
pub struct PlaybackController {
    /// Index of the frame currently in the frame store.
    frame: u64,
    /// Index of the frame the stream position points at.
    next_frame: u64,
    paused: bool,
    pending_pause: Option<bool>,
    pending_seek: Option<i64>,
    reload: bool,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether a forced reload is waiting for the next boundary.
    pub fn reload_pending(&self) -> bool {
        self.reload
    }

    pub fn pending_pause(&self) -> Option<bool> {
        self.pending_pause
    }

    pub fn pending_seek(&self) -> Option<i64> {
        self.pending_seek
    }

    /// Ask to flip the pause state at the next boundary.
    ///
    /// Also forces a reload so that a fresh frame is read (and muted, when
    /// pausing) even if playback is already paused.
    pub fn request_pause_toggle(&mut self) {
        self.pending_pause = Some(!self.paused);
        self.reload = true;
    }

    /// Ask to move by `delta` frames at the next boundary.
    pub fn request_seek(&mut self, delta: i64) {
        self.pending_seek = Some(delta);
    }

    pub fn post(&mut self, intent: Intent) {
        match intent {
            Intent::TogglePause => self.request_pause_toggle(),
            Intent::Seek(delta) => self.request_seek(delta),
        }
    }

    /// Decide whether the driver must read a new frame at this boundary.
    ///
    /// True when playing or when a reload was forced; consumes the reload flag.
    pub(crate) fn take_load(&mut self) -> bool {
        if !self.paused || self.reload {
            self.reload = false;
            true
        } else {
            false
        }
    }

    /// Record that the frame at the stream position was just loaded.
    pub(crate) fn advance(&mut self) {
        self.frame = self.next_frame;
        self.next_frame += 1;
    }

    /// Apply at most one pending intent; a pause change takes priority over a seek.
    ///
    /// A seek by `delta` moves the stream by `delta - 1` frames. While playing
    /// this cancels the advance already made at this boundary: the frame index
    /// becomes `delta` away from the frame current when the seek was posted,
    /// and the next boundary loads the frame after it. While paused the index
    /// becomes the frame the forced reload will hold. Targets before the first
    /// frame are clamped to frame 0.
    pub fn apply_pending_at_boundary<S: FrameSource + ?Sized>(
        &mut self,
        source: &mut S,
        standard: VideoStandard,
    ) -> Result<Option<Applied>> {
        if let Some(paused) = self.pending_pause.take() {
            self.paused = paused;
            self.reload = true;
            return Ok(Some(Applied::Pause(paused)));
        }

        let Some(delta) = self.pending_seek.take() else {
            return Ok(None);
        };

        let mut adjusted = delta.saturating_sub(1);
        let earliest = -(self.next_frame as i64);
        if adjusted < earliest {
            adjusted = earliest;
        }

        source
            .seek_relative(adjusted.saturating_mul(standard.frame_size() as i64))
            .map_err(|e| DvError::Seek {
                frames: adjusted,
                source: e,
            })?;

        let target = (self.next_frame as i64 + adjusted) as u64;
        self.next_frame = target;
        self.frame = if self.paused {
            target
        } else {
            target.saturating_sub(1)
        };
        self.reload = true;
        Ok(Some(Applied::Seek {
            frame: self.frame,
            target,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FS: usize = 120_000;

    /// Controller that has loaded `frames` frames from `src`, positioned after the last.
    fn played(frames: u64, src: &mut Cursor<Vec<u8>>) -> PlaybackController {
        let mut pc = PlaybackController::new();
        for _ in 0..frames {
            assert!(pc.take_load());
            pc.advance();
        }
        src.set_position(frames * FS as u64);
        pc
    }

    #[test]
    fn test_requests_do_not_apply_until_boundary() {
        let mut pc = PlaybackController::new();
        pc.request_pause_toggle();
        pc.request_seek(5);
        assert!(!pc.is_paused());
        assert_eq!(pc.pending_pause(), Some(true));
        assert_eq!(pc.pending_seek(), Some(5));
        assert!(pc.reload_pending());
    }

    #[test]
    fn test_last_seek_wins() {
        let mut pc = PlaybackController::new();
        pc.post(Intent::Seek(50));
        pc.post(Intent::Seek(-1));
        assert_eq!(pc.pending_seek(), Some(-1));
    }

    #[test]
    fn test_pause_applies_before_seek() {
        let mut src = Cursor::new(vec![0u8; FS * 20]);
        let mut pc = played(5, &mut src);
        pc.request_seek(3);
        pc.request_pause_toggle();

        let applied = pc.apply_pending_at_boundary(&mut src, VideoStandard::Ntsc).unwrap();
        assert_eq!(applied, Some(Applied::Pause(true)));
        assert!(pc.is_paused());
        assert_eq!(pc.pending_seek(), Some(3));
        assert_eq!(src.position(), 5 * FS as u64);

        let applied = pc.apply_pending_at_boundary(&mut src, VideoStandard::Ntsc).unwrap();
        assert_eq!(applied, Some(Applied::Seek { frame: 7, target: 7 }));
        assert_eq!(pc.apply_pending_at_boundary(&mut src, VideoStandard::Ntsc).unwrap(), None);
    }

    #[test]
    fn test_seek_adjusts_by_one() {
        let mut src = Cursor::new(vec![0u8; FS * 20]);
        // Frame 10 is current, stream positioned at frame 11
        let mut pc = played(11, &mut src);
        assert_eq!(pc.frame(), 10);

        pc.request_seek(1);
        let applied = pc.apply_pending_at_boundary(&mut src, VideoStandard::Ntsc).unwrap();
        assert_eq!(applied, Some(Applied::Seek { frame: 10, target: 11 }));
        assert_eq!(src.position(), 11 * FS as u64);
        assert!(pc.reload_pending());

        pc.request_seek(-1);
        pc.apply_pending_at_boundary(&mut src, VideoStandard::Ntsc).unwrap();
        assert_eq!(src.position(), 9 * FS as u64);

        pc.advance();
        assert_eq!(pc.frame(), 9);
    }

    #[test]
    fn test_seek_moves_frame_index_when_applied() {
        let mut src = Cursor::new(vec![0u8; FS * 60]);
        for delta in [1i64, 25, -1, -5] {
            // Posted on frame 10; the boundary has just loaded frame 11
            let mut pc = played(12, &mut src);
            assert_eq!(pc.frame(), 11);

            pc.request_seek(delta);
            pc.apply_pending_at_boundary(&mut src, VideoStandard::Ntsc).unwrap();
            assert_eq!(pc.frame() as i64, 10 + delta, "delta {delta}");

            assert!(pc.take_load());
            pc.advance();
            assert_eq!(pc.frame() as i64, 11 + delta, "delta {delta}");
            assert_eq!(src.position() as i64, (11 + delta) * FS as i64, "delta {delta}");
        }
    }

    #[test]
    fn test_seek_zero_repeats_current_frame() {
        let mut src = Cursor::new(vec![0u8; FS * 20]);
        let mut pc = played(4, &mut src);
        pc.request_seek(0);
        pc.apply_pending_at_boundary(&mut src, VideoStandard::Ntsc).unwrap();
        assert_eq!(src.position(), 3 * FS as u64);
        pc.advance();
        assert_eq!(pc.frame(), 3);
    }

    #[test]
    fn test_seek_before_start_clamps() {
        let mut src = Cursor::new(vec![0u8; FS * 20]);
        let mut pc = played(3, &mut src);
        pc.request_seek(-50);
        let applied = pc.apply_pending_at_boundary(&mut src, VideoStandard::Ntsc).unwrap();
        assert_eq!(applied, Some(Applied::Seek { frame: 0, target: 0 }));
        assert_eq!(src.position(), 0);
        pc.advance();
        assert_eq!(pc.frame(), 0);
    }

    #[test]
    fn test_paused_skips_load_unless_reload() {
        let mut src = Cursor::new(vec![0u8; FS * 20]);
        let mut pc = played(1, &mut src);
        pc.request_pause_toggle();
        // Reload was forced by the request
        assert!(pc.take_load());
        pc.advance();
        pc.apply_pending_at_boundary(&mut src, VideoStandard::Ntsc).unwrap();
        assert!(pc.is_paused());
        // Reload forced again by applying the pause
        assert!(pc.take_load());
        assert!(!pc.take_load());
        assert!(!pc.take_load());
    }
}
