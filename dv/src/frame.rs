use crate::audio;
use crate::dif::{FRAME_SIZE_MAX, PACKET_SIZE, VideoStandard};
use crate::error::{DvError, Result};
use crate::source::FrameSource;
use crate::timecode::{self, Timecode};

/// Holds the frame currently being served, one frame at a time.
///
/// The buffer is sized for the largest standard and reused for every frame.
pub struct FrameStore {
    buf: Box<[u8]>,
    standard: VideoStandard,
    /// Bytes of the next frame already read while detecting the standard.
    primed: usize,
}

impl FrameStore {
    /// Read the first packet of `source` to detect the video standard.
    ///
    /// The packet is kept as the start of the first frame, so the stream is
    /// consumed from its first byte without seeking back.
    pub fn open<S: FrameSource + ?Sized>(source: &mut S) -> Result<Self> {
        let mut buf = vec![0u8; FRAME_SIZE_MAX].into_boxed_slice();
        let got = source.read_full(&mut buf[..PACKET_SIZE])?;
        if got < PACKET_SIZE {
            return Err(DvError::ShortHeader {
                expected: PACKET_SIZE,
                got,
            });
        }
        let standard = VideoStandard::detect(&buf[..PACKET_SIZE]);
        Ok(Self {
            buf,
            standard,
            primed: PACKET_SIZE,
        })
    }

    /// Create an empty store for a known standard; nothing is primed.
    #[cfg(test)]
    fn with_standard(standard: VideoStandard) -> Self {
        Self {
            buf: vec![0u8; FRAME_SIZE_MAX].into_boxed_slice(),
            standard,
            primed: 0,
        }
    }

    pub fn standard(&self) -> VideoStandard {
        self.standard
    }

    pub fn packets_per_frame(&self) -> usize {
        self.standard.packets_per_frame()
    }

    /// Replace the buffer contents with the next frame from `source`.
    ///
    /// A short read is terminal: the partial frame is left in the buffer and
    /// `EndOfStream` returned. There is no retry.
    pub fn load_next_frame<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        let frame_size = self.standard.frame_size();
        let primed = std::mem::take(&mut self.primed);
        let got = primed + source.read_full(&mut self.buf[primed..frame_size])?;
        if got < frame_size {
            return Err(DvError::EndOfStream {
                expected: frame_size,
                got,
            });
        }
        Ok(())
    }

    /// View of packet `index` of the current frame.
    ///
    /// # Panics
    /// If `index >= packets_per_frame()`.
    pub fn packet_at(&self, index: usize) -> &[u8] {
        assert!(
            index < self.packets_per_frame(),
            "packet index {} out of range for {} frame",
            index,
            self.standard
        );
        let off = index * PACKET_SIZE;
        &self.buf[off..off + PACKET_SIZE]
    }

    pub fn frame(&self) -> &[u8] {
        &self.buf[..self.standard.frame_size()]
    }

    pub fn frame_mut(&mut self) -> &mut [u8] {
        let size = self.standard.frame_size();
        &mut self.buf[..size]
    }

    pub fn timecode(&self) -> Option<Timecode> {
        timecode::extract_timecode(self.frame(), self.standard)
    }

    pub fn mute_audio(&mut self) {
        let standard = self.standard;
        audio::mute_audio(self.frame_mut(), standard);
    }
}
