/// Size of a single DIF block in bytes.
pub const DIF_BLOCK_SIZE: usize = 80;
/// DIF blocks in one DIF sequence.
pub const DIF_BLOCKS_PER_SEQUENCE: usize = 150;
pub const SEQUENCES_PER_FRAME_PAL: usize = 12;
pub const SEQUENCES_PER_FRAME_NTSC: usize = 10;

pub const FRAME_SIZE_PAL: usize = DIF_BLOCK_SIZE * DIF_BLOCKS_PER_SEQUENCE * SEQUENCES_PER_FRAME_PAL;
pub const FRAME_SIZE_NTSC: usize = DIF_BLOCK_SIZE * DIF_BLOCKS_PER_SEQUENCE * SEQUENCES_PER_FRAME_NTSC;
/// Largest frame of any supported standard.
pub const FRAME_SIZE_MAX: usize = FRAME_SIZE_PAL;

/// DIF blocks carried by one transport packet.
pub const BLOCKS_PER_PACKET: usize = 6;
/// Size of a transport packet handed to the transmitter.
pub const PACKET_SIZE: usize = DIF_BLOCK_SIZE * BLOCKS_PER_PACKET;

/// Section type from the top three bits of a DIF block ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum BlockType {
    Header,
    Subcode,
    Vaux,
    Audio,
    Video,
    /// Section types 5-7 are unassigned.
    Reserved(u8),
}

impl BlockType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => BlockType::Header,
            1 => BlockType::Subcode,
            2 => BlockType::Vaux,
            3 => BlockType::Audio,
            4 => BlockType::Video,
            other => BlockType::Reserved(other),
        }
    }
}

/// Classify a DIF block by its section type. Only byte 0 is inspected.
pub fn classify_block(block: &[u8]) -> BlockType {
    BlockType::from_bits(block[0] >> 5)
}

/// Video standard of a DV stream, which fixes the frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum VideoStandard {
    Pal,
    Ntsc,
}

impl VideoStandard {
    /// Detect the standard from the DSF flag (bit 7 of byte 3 of the header block).
    ///
    /// `header` must be at least 4 bytes; callers pass the first packet of the stream.
    pub fn detect(header: &[u8]) -> Self {
        if header[3] & 0x80 != 0 {
            VideoStandard::Pal
        } else {
            VideoStandard::Ntsc
        }
    }

    pub fn sequences(self) -> usize {
        match self {
            VideoStandard::Pal => SEQUENCES_PER_FRAME_PAL,
            VideoStandard::Ntsc => SEQUENCES_PER_FRAME_NTSC,
        }
    }

    pub fn blocks_per_frame(self) -> usize {
        self.sequences() * DIF_BLOCKS_PER_SEQUENCE
    }

    pub fn frame_size(self) -> usize {
        self.blocks_per_frame() * DIF_BLOCK_SIZE
    }

    /// Number of transport packets in one frame (300 PAL, 250 NTSC).
    pub fn packets_per_frame(self) -> usize {
        self.frame_size() / PACKET_SIZE
    }

    /// Nominal frame rate as a (numerator, denominator) pair.
    pub fn frame_rate(self) -> (u32, u32) {
        match self {
            VideoStandard::Pal => (25, 1),
            VideoStandard::Ntsc => (30_000, 1_001),
        }
    }

    /// Nominal packet rate at which a transmitter consumes this stream.
    pub fn packets_per_second(self) -> f64 {
        let (num, den) = self.frame_rate();
        self.packets_per_frame() as f64 * num as f64 / den as f64
    }

    pub fn name(self) -> &'static str {
        match self {
            VideoStandard::Pal => "PAL",
            VideoStandard::Ntsc => "NTSC",
        }
    }
}

impl std::fmt::Display for VideoStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Iterate the DIF blocks of a frame in sequence order.
///
/// Only the blocks belonging to `standard` are visited, so a PAL-sized buffer
/// holding an NTSC frame never yields stale trailing blocks.
pub fn blocks(frame: &[u8], standard: VideoStandard) -> impl Iterator<Item = &[u8]> {
    frame[..standard.frame_size()].chunks_exact(DIF_BLOCK_SIZE)
}

/// Mutable counterpart of [`blocks`].
pub fn blocks_mut(frame: &mut [u8], standard: VideoStandard) -> impl Iterator<Item = &mut [u8]> {
    frame[..standard.frame_size()].chunks_exact_mut(DIF_BLOCK_SIZE)
}
