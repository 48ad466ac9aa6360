use crate::dif::{self, BlockType, VideoStandard};
use crate::error::{DvError, Result};
use crate::frame::FrameStore;
use crate::source::FrameSource;
use crate::timecode::Timecode;

/// Number of DIF blocks of each section type in a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct BlockCounts {
    pub header: u32,
    pub subcode: u32,
    pub vaux: u32,
    pub audio: u32,
    pub video: u32,
    pub reserved: u32,
}

impl BlockCounts {
    pub fn of_frame(frame: &[u8], standard: VideoStandard) -> Self {
        let mut counts = Self::default();
        for block in dif::blocks(frame, standard) {
            match dif::classify_block(block) {
                BlockType::Header => counts.header += 1,
                BlockType::Subcode => counts.subcode += 1,
                BlockType::Vaux => counts.vaux += 1,
                BlockType::Audio => counts.audio += 1,
                BlockType::Video => counts.video += 1,
                BlockType::Reserved(_) => counts.reserved += 1,
            }
        }
        counts
    }
}

/// Summary of one frame of a scanned stream.
#[derive(Debug, Clone, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct FrameSummary {
    pub index: u64,
    /// Byte offset of the frame from the start of the stream.
    pub offset: u64,
    /// Timecode carried by this frame (not latched from earlier frames).
    pub timecode: Option<Timecode>,
    pub blocks: BlockCounts,
}

/// Result of scanning a DV stream.
#[derive(Debug, Clone, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct DvScan {
    pub standard: VideoStandard,
    pub frame_size: usize,
    pub frames: Vec<FrameSummary>,
    /// Bytes after the last whole frame (a truncated final frame).
    pub trailing_bytes: usize,
}

/// Scan frames from `source` until the end of the stream or `limit` frames.
pub fn scan_dv<S: FrameSource + ?Sized>(source: &mut S, limit: Option<u64>) -> Result<DvScan> {
    let mut store = FrameStore::open(source)?;
    let standard = store.standard();
    let frame_size = standard.frame_size();

    let mut frames = Vec::new();
    let mut trailing_bytes = 0;

    while limit.is_none_or(|l| (frames.len() as u64) < l) {
        match store.load_next_frame(source) {
            Ok(()) => {}
            Err(DvError::EndOfStream { got, .. }) => {
                trailing_bytes = got;
                break;
            }
            Err(e) => return Err(e),
        }

        let index = frames.len() as u64;
        frames.push(FrameSummary {
            index,
            offset: index * frame_size as u64,
            timecode: store.timecode(),
            blocks: BlockCounts::of_frame(store.frame(), standard),
        });
    }

    Ok(DvScan {
        standard,
        frame_size,
        frames,
        trailing_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dif::{DIF_BLOCK_SIZE, DIF_BLOCKS_PER_SEQUENCE, FRAME_SIZE_PAL};
    use std::io::Cursor;

    /// A PAL frame with the usual block layout: per sequence 1 header,
    /// 2 subcode, 3 VAUX, then 135 video blocks with an audio block every 16th.
    fn pal_frame(tc: Option<Timecode>) -> Vec<u8> {
        let mut frame = vec![0u8; FRAME_SIZE_PAL];
        for (i, block) in frame.chunks_exact_mut(DIF_BLOCK_SIZE).enumerate() {
            let b = i % DIF_BLOCKS_PER_SEQUENCE;
            let section = match b {
                0 => 0,
                1..=2 => 1,
                3..=5 => 2,
                _ if (b - 6) % 16 == 0 => 3,
                _ => 4,
            };
            block[0] = (section << 5) | 0x1F;
        }
        frame[3] = 0x80;
        if let Some(tc) = tc {
            let off = DIF_BLOCK_SIZE + 3;
            frame[off..off + 8].copy_from_slice(&tc.to_ssyb());
        }
        frame
    }

    #[test]
    fn test_block_counts_pal() {
        let counts = BlockCounts::of_frame(&pal_frame(None), VideoStandard::Pal);
        assert_eq!(
            counts,
            BlockCounts {
                header: 12,
                subcode: 24,
                vaux: 36,
                audio: 108,
                video: 1620,
                reserved: 0,
            }
        );
    }

    #[test]
    fn test_scan_frames_and_trailing_bytes() {
        let mut data = pal_frame(Some(Timecode::new(10, 0, 0, 0)));
        data.extend(pal_frame(None));
        data.extend_from_slice(&[0u8; 1234]);

        let scan = scan_dv(&mut Cursor::new(data), None).unwrap();
        assert_eq!(scan.standard, VideoStandard::Pal);
        assert_eq!(scan.frame_size, FRAME_SIZE_PAL);
        assert_eq!(scan.frames.len(), 2);
        assert_eq!(scan.frames[0].timecode, Some(Timecode::new(10, 0, 0, 0)));
        assert_eq!(scan.frames[1].timecode, None);
        assert_eq!(scan.frames[1].offset, FRAME_SIZE_PAL as u64);
        assert_eq!(scan.trailing_bytes, 1234);
    }

    #[test]
    fn test_scan_limit() {
        let mut data = Vec::new();
        for _ in 0..3 {
            data.extend(pal_frame(None));
        }
        let scan = scan_dv(&mut Cursor::new(data), Some(2)).unwrap();
        assert_eq!(scan.frames.len(), 2);
        assert_eq!(scan.trailing_bytes, 0);
    }
}
