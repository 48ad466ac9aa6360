use crate::dif::{self, BlockType, VideoStandard};

/// Size of one subcode sync block (SSYB).
pub const SSYB_SIZE: usize = 8;
/// SSYBs carried by each Subcode DIF block.
pub const SSYBS_PER_BLOCK: usize = 6;
/// Offset of the first SSYB within a Subcode DIF block (after the 3-byte block ID).
pub const SSYB_OFFSET: usize = 3;
/// SSYB pack number holding the timecode.
pub const TIMECODE_PACK: u8 = 3;

/// Text shown before any timecode has been decoded.
pub const TIMECODE_PLACEHOLDER: &str = "--:--:--.--";

/// SMPTE-style timecode decoded from a DV subcode pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Timecode {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
}

/// Decode a two-digit BCD field; `high_mask` selects the tens bits that belong to the value.
fn bcd(byte: u8, high_mask: u8) -> u8 {
    (byte & 0x0F) + ((byte & high_mask) >> 4) * 10
}

fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

impl Timecode {
    pub fn new(hours: u8, minutes: u8, seconds: u8, frames: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
        }
    }

    /// Decode the timecode from an 8-byte SSYB carrying pack 3.
    ///
    /// Bytes 4..8 hold frames, seconds, minutes and hours. The high nibble of
    /// each byte also carries flag bits (drop frame, colour frame, binary group
    /// flags), which are masked off: frames and hours keep two tens bits,
    /// seconds and minutes keep three.
    pub fn from_ssyb(ssyb: &[u8]) -> Self {
        Self {
            frames: bcd(ssyb[4], 0x30),
            seconds: bcd(ssyb[5], 0x70),
            minutes: bcd(ssyb[6], 0x70),
            hours: bcd(ssyb[7], 0x30),
        }
    }

    /// Encode as a pack-3 SSYB, the inverse of [`Timecode::from_ssyb`].
    pub fn to_ssyb(&self) -> [u8; SSYB_SIZE] {
        [
            0x80,
            TIMECODE_PACK,
            0xFF,
            0x13, // timecode pack header
            to_bcd(self.frames),
            to_bcd(self.seconds),
            to_bcd(self.minutes),
            to_bcd(self.hours),
        ]
    }
}

impl std::fmt::Display for Timecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Pack number of an SSYB (low nibble of its second byte).
pub fn pack_number(ssyb: &[u8]) -> u8 {
    ssyb[1] & 0x0F
}

/// Find the first timecode pack in a frame.
///
/// Blocks are scanned in sequence order and the SSYBs of each Subcode block in
/// order; the first SSYB with pack number 3 wins. Returns `None` when no
/// Subcode block carries one, in which case callers keep the previous value.
pub fn extract_timecode(frame: &[u8], standard: VideoStandard) -> Option<Timecode> {
    dif::blocks(frame, standard)
        .filter(|block| dif::classify_block(block) == BlockType::Subcode)
        .flat_map(|block| {
            block[SSYB_OFFSET..SSYB_OFFSET + SSYB_SIZE * SSYBS_PER_BLOCK].chunks_exact(SSYB_SIZE)
        })
        .find(|ssyb| pack_number(ssyb) == TIMECODE_PACK)
        .map(Timecode::from_ssyb)
}
