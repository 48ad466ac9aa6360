use crate::dif::{PACKET_SIZE, VideoStandard};
use crate::error::{DvError, Result};
use crate::frame::FrameStore;
use crate::playback::{Applied, Intent, PlaybackController};
use crate::source::FrameSource;
use crate::timecode::{TIMECODE_PLACEHOLDER, Timecode};
use crate::transport::{PULL_OK, PULL_STOP};

/// Read-only view of playback state for display.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct PlaybackSnapshot {
    /// Index of the frame being served (0 = first frame of the stream).
    pub frame: u64,
    pub paused: bool,
    /// `HH:MM:SS.FF`, or the last decoded value if the current frame has none.
    pub timecode: String,
    pub standard: VideoStandard,
    pub seekable: bool,
    /// Packet slots the transmitter reported as dropped.
    pub dropped_packets: u64,
}

/// Serves a DV stream one transport packet at a time.
///
/// Owns the frame store, playback controller and the packet cursor. All frame
/// loads, muting, timecode refreshes and intent application happen when the
/// cursor wraps from the last packet of a frame to the first of the next.
pub struct PacketSource<S> {
    source: S,
    store: FrameStore,
    controller: PlaybackController,
    cursor: usize,
    timecode: Option<Timecode>,
    dropped: u64,
    boundaries: u64,
    /// Intents applied at boundaries since the last drain.
    applied: Vec<Applied>,
    error: Option<DvError>,
    finished: bool,
}

impl<S: FrameSource> PacketSource<S> {
    /// Detect the standard from the first packet of `source`.
    ///
    /// No frame is loaded yet: the first pull crosses a boundary, loads frame 0
    /// and serves its first packet.
    pub fn open(mut source: S) -> Result<Self> {
        let store = FrameStore::open(&mut source)?;
        let cursor = store.packets_per_frame() - 1;
        Ok(Self {
            source,
            store,
            controller: PlaybackController::new(),
            cursor,
            timecode: None,
            dropped: 0,
            boundaries: 0,
            applied: Vec::new(),
            error: None,
            finished: false,
        })
    }

    pub fn standard(&self) -> VideoStandard {
        self.store.standard()
    }

    pub fn is_seekable(&self) -> bool {
        self.source.is_seekable()
    }

    /// Packet index within the current frame.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of frame boundaries crossed so far.
    pub fn boundaries(&self) -> u64 {
        self.boundaries
    }

    pub fn timecode(&self) -> Option<Timecode> {
        self.timecode
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take the error that ended the stream, if any.
    pub fn take_error(&mut self) -> Option<DvError> {
        self.error.take()
    }

    pub fn request_pause_toggle(&mut self) {
        self.controller.request_pause_toggle();
    }

    /// Queue a relative seek; refused on sources that cannot seek.
    pub fn request_seek(&mut self, delta: i64) -> Result<()> {
        if !self.source.is_seekable() {
            return Err(DvError::SeekUnsupported);
        }
        self.controller.request_seek(delta);
        Ok(())
    }

    pub fn post(&mut self, intent: Intent) -> Result<()> {
        if matches!(intent, Intent::Seek(_)) && !self.source.is_seekable() {
            return Err(DvError::SeekUnsupported);
        }
        self.controller.post(intent);
        Ok(())
    }

    /// Take the intents applied since the previous call, oldest first.
    pub fn drain_applied(&mut self) -> std::vec::Drain<'_, Applied> {
        self.applied.drain(..)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            frame: self.controller.frame(),
            paused: self.controller.is_paused(),
            timecode: match self.timecode {
                Some(tc) => tc.to_string(),
                None => TIMECODE_PLACEHOLDER.to_string(),
            },
            standard: self.store.standard(),
            seekable: self.source.is_seekable(),
            dropped_packets: self.dropped,
        }
    }

    /// Pull-callback entry point: `(buffer, requested, dropped) -> status`.
    ///
    /// Only single-packet requests are served; any other `requested` count is
    /// ignored and reported as success. Returns [`PULL_STOP`] once the stream
    /// is exhausted or a seek failed, and keeps doing so on later calls.
    pub fn pull(&mut self, data: &mut [u8], requested: i32, dropped: u32) -> i32 {
        if requested != 1 {
            return PULL_OK;
        }
        if self.finished {
            return PULL_STOP;
        }
        self.dropped += dropped as u64;
        match self.next_packet(data) {
            Ok(()) => PULL_OK,
            Err(e) => {
                self.finished = true;
                self.error = Some(e);
                PULL_STOP
            }
        }
    }

    /// Copy the next packet into the first [`PACKET_SIZE`] bytes of `out`.
    pub fn next_packet(&mut self, out: &mut [u8]) -> Result<()> {
        self.cursor += 1;
        if self.cursor == self.store.packets_per_frame() {
            self.cursor = 0;
            self.cross_boundary()?;
        }
        out[..PACKET_SIZE].copy_from_slice(self.store.packet_at(self.cursor));
        Ok(())
    }

    fn cross_boundary(&mut self) -> Result<()> {
        self.boundaries += 1;

        if self.controller.take_load() {
            self.controller.advance();
            self.store.load_next_frame(&mut self.source)?;
            if self.controller.is_paused() {
                self.store.mute_audio();
            }
        }

        // Keep the previous value when this frame has no timecode pack
        if let Some(tc) = self.store.timecode() {
            self.timecode = Some(tc);
        }

        let standard = self.store.standard();
        if let Some(applied) = self
            .controller
            .apply_pending_at_boundary(&mut self.source, standard)?
        {
            self.applied.push(applied);
        }
        Ok(())
    }
}

/// [`crate::transport::PullCallback`] implementation over a [`PacketSource`].
pub fn read_packet<S: FrameSource>(
    data: &mut [u8],
    requested: i32,
    dropped: u32,
    source: &mut PacketSource<S>,
) -> i32 {
    source.pull(data, requested, dropped)
}
