use thiserror::Error;

#[derive(Error, Debug)]
pub enum DvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("end of stream: expected {expected} bytes for a full frame, got {got}")]
    EndOfStream { expected: usize, got: usize },

    #[error("stream too short to detect video standard: expected {expected} bytes, got {got}")]
    ShortHeader { expected: usize, got: usize },

    #[error("seeking is not supported on a non-seekable source")]
    SeekUnsupported,

    #[error("I/O error seeking by {frames} frame(s): {source}")]
    Seek {
        frames: i64,
        source: std::io::Error,
    },
}

impl DvError {
    /// True when the source ran out of data at a frame boundary.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, DvError::EndOfStream { .. })
    }
}

pub type Result<T> = std::result::Result<T, DvError>;
