use crate::dif::{self, BlockType, DIF_BLOCK_SIZE, VideoStandard};

/// Bytes at the start of an audio DIF block kept by [`mute_audio`]:
/// the 3-byte block ID and the 5-byte AAUX pack.
pub const AUDIO_HEADER_SIZE: usize = 8;

/// Silence a frame by zeroing the sample data of every Audio DIF block.
///
/// The block ID and AAUX pack are left in place so the receiver still sees a
/// well-formed audio section. Calling this on an already muted frame is a no-op.
pub fn mute_audio(frame: &mut [u8], standard: VideoStandard) {
    for block in dif::blocks_mut(frame, standard) {
        if dif::classify_block(block) == BlockType::Audio {
            block[AUDIO_HEADER_SIZE..DIF_BLOCK_SIZE].fill(0);
        }
    }
}

/// True if every Audio DIF block in the frame carries zeroed sample data.
pub fn is_muted(frame: &[u8], standard: VideoStandard) -> bool {
    dif::blocks(frame, standard)
        .filter(|block| dif::classify_block(block) == BlockType::Audio)
        .all(|block| block[AUDIO_HEADER_SIZE..].iter().all(|&b| b == 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dif::FRAME_SIZE_NTSC;

    /// Alternate audio and video blocks, all payload bytes set to 0xAB.
    fn mixed_frame() -> Vec<u8> {
        let mut frame = vec![0xABu8; FRAME_SIZE_NTSC];
        for (i, block) in frame.chunks_exact_mut(DIF_BLOCK_SIZE).enumerate() {
            block[0] = if i % 2 == 0 { 0x70 } else { 0x90 };
        }
        frame
    }

    #[test]
    fn test_mute_zeroes_only_audio_payload() {
        let original = mixed_frame();
        let mut frame = original.clone();
        mute_audio(&mut frame, VideoStandard::Ntsc);

        for (i, (muted, orig)) in frame
            .chunks_exact(DIF_BLOCK_SIZE)
            .zip(original.chunks_exact(DIF_BLOCK_SIZE))
            .enumerate()
        {
            if i % 2 == 0 {
                assert_eq!(&muted[..AUDIO_HEADER_SIZE], &orig[..AUDIO_HEADER_SIZE]);
                assert!(muted[AUDIO_HEADER_SIZE..].iter().all(|&b| b == 0));
            } else {
                assert_eq!(muted, orig, "video block {} modified", i);
            }
        }
        assert!(is_muted(&frame, VideoStandard::Ntsc));
    }

    #[test]
    fn test_mute_is_idempotent() {
        let mut once = mixed_frame();
        mute_audio(&mut once, VideoStandard::Ntsc);
        let mut thrice = once.clone();
        mute_audio(&mut thrice, VideoStandard::Ntsc);
        mute_audio(&mut thrice, VideoStandard::Ntsc);
        assert_eq!(once, thrice);
    }

    #[test]
    fn test_unmuted_frame_detected() {
        assert!(!is_muted(&mixed_frame(), VideoStandard::Ntsc));
    }
}
